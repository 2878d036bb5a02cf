use plotters::prelude::*;
use plotters_canvas::CanvasBackend;
use shared::time_utils::format_hours;
use shared::{calculate_repartition_percentages, get_sorted_categories, Category, WeekTotals};
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

const CANVAS_WIDTH: u32 = 480;
const CANVAS_HEIGHT: u32 = 260;

#[derive(Properties, PartialEq)]
pub struct RepartitionPanelProps {
    pub totals: WeekTotals,
}

pub enum Msg {
    DrawChart,
}

/// Hours per category of the displayed week, as bars plus a legend
pub struct RepartitionPanel {
    canvas_ref: NodeRef,
}

/// Rows of the legend: category, hours and share in percent
fn legend_rows(totals: &WeekTotals) -> Vec<(Category, f64, f64)> {
    let percentages = calculate_repartition_percentages(&totals.by_category);
    get_sorted_categories(&totals.by_category)
        .into_iter()
        .map(|(category, hours)| {
            let share = percentages.get(&category).copied().unwrap_or(0.0);
            (category, hours, share)
        })
        .collect()
}

impl Component for RepartitionPanel {
    type Message = Msg;
    type Properties = RepartitionPanelProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            canvas_ref: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::DrawChart => {
                self.draw_chart(&ctx.props().totals);
                false
            }
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        ctx.props().totals != old_props.totals
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        ctx.link().send_message(Msg::DrawChart);
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let totals = &ctx.props().totals;
        let rows = legend_rows(totals);

        html! {
            <section class="repartition-panel">
                <div class="repartition-header">
                    <h3>{"Répartition"}</h3>
                    <span class="week-total">{format!("Total : {}", format_hours(totals.week))}</span>
                </div>
                {if rows.is_empty() {
                    html! { <p class="chart-empty">{"Aucun créneau cette semaine"}</p> }
                } else {
                    html! {
                        <>
                            <canvas
                                ref={self.canvas_ref.clone()}
                                class="repartition-canvas"
                                width={CANVAS_WIDTH.to_string()}
                                height={CANVAS_HEIGHT.to_string()}
                            ></canvas>
                            <ul class="repartition-legend">
                                {for rows.iter().map(|(category, hours, share)| {
                                    let style = category.style();
                                    html! {
                                        <li key={category.code().to_string()}>
                                            <span class="legend-swatch" style={format!("background: {};", style.color_hex())}></span>
                                            <span class="legend-label">{category.label()}</span>
                                            <span class="legend-value">{format!("{:.1}h ({:.0}%)", hours, share)}</span>
                                        </li>
                                    }
                                })}
                            </ul>
                        </>
                    }
                }}
            </section>
        }
    }
}

impl RepartitionPanel {
    fn draw_chart(&self, totals: &WeekTotals) {
        let bars = get_sorted_categories(&totals.by_category);
        if bars.is_empty() {
            return;
        }

        let canvas = match self.canvas_ref.cast::<HtmlCanvasElement>() {
            Some(canvas) => canvas,
            None => return,
        };
        canvas.set_width(CANVAS_WIDTH);
        canvas.set_height(CANVAS_HEIGHT);

        let backend = match CanvasBackend::with_canvas_object(canvas) {
            Some(backend) => backend,
            None => return,
        };
        let root = backend.into_drawing_area();
        if root.fill(&WHITE).is_err() {
            return;
        }

        let max_hours = bars.iter().map(|(_, hours)| *hours).fold(0.0_f64, f64::max);
        let y_max = (max_hours * 1.15).max(1.0);
        let labels: Vec<&'static str> = bars.iter().map(|(category, _)| category.label()).collect();

        let mut chart = match ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..bars.len() as f64, 0.0..y_max)
        {
            Ok(chart) => chart,
            Err(_) => return,
        };

        if chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|v| {
                labels
                    .get(v.floor() as usize)
                    .map(|label| label.to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|v| format!("{:.0}h", v))
            .label_style(("sans-serif", 11, &RGBColor(75, 85, 99)))
            .axis_style(&RGBColor(220, 220, 220))
            .bold_line_style(&RGBColor(240, 240, 240))
            .light_line_style(&RGBColor(250, 250, 250))
            .y_labels(6)
            .draw()
            .is_err()
        {
            return;
        }

        let rectangles = bars.iter().enumerate().map(|(index, (category, hours))| {
            let (r, g, b) = category.style().rgb;
            let left = index as f64 + 0.15;
            Rectangle::new([(left, 0.0), (left + 0.7, *hours)], RGBColor(r, g, b).filled())
        });
        if chart.draw_series(rectangles).is_err() {
            return;
        }

        let _ = root.present();
    }
}
