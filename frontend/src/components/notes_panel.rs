use shared::WeekNotes;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

use crate::hooks::use_employees::Responder;
use crate::services::date_utils::format_timestamp;

#[derive(Properties, PartialEq)]
pub struct NotesPanelProps {
    pub notes: Option<WeekNotes>,
    pub read_only: bool,
    pub on_save: Callback<(String, Responder)>,
}

#[function_component(NotesPanel)]
pub fn notes_panel(props: &NotesPanelProps) -> Html {
    let saved = props
        .notes
        .as_ref()
        .map(|n| n.comment.clone())
        .unwrap_or_default();
    let draft = use_state(|| saved.clone());
    let saving = use_state(|| false);
    let status = use_state(|| Option::<Result<(), String>>::None);

    use_effect_with(saved.clone(), {
        let draft = draft.clone();
        let status = status.clone();
        move |saved: &String| {
            draft.set(saved.clone());
            status.set(None);
            || ()
        }
    });

    let on_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            draft.set(area.value());
        })
    };

    let on_save = {
        let draft = draft.clone();
        let saving = saving.clone();
        let status = status.clone();
        let save = props.on_save.clone();
        Callback::from(move |_: MouseEvent| {
            saving.set(true);
            let responder = {
                let saving = saving.clone();
                let status = status.clone();
                Callback::from(move |result: Result<(), String>| {
                    saving.set(false);
                    status.set(Some(result));
                })
            };
            save.emit(((*draft).clone(), responder));
        })
    };

    let edited_by = props.notes.as_ref().and_then(|notes| {
        let editor = notes.last_editor.clone()?;
        Some(match &notes.updated_at {
            Some(at) => format!("Modifié par {} le {}", editor, format_timestamp(at)),
            None => format!("Modifié par {}", editor),
        })
    });

    html! {
        <section class="notes-panel">
            <h3>{"Notes de la semaine"}</h3>
            {if props.read_only {
                html! {
                    <p class="notes-text">
                        {if saved.trim().is_empty() { "Aucune note".to_string() } else { saved.clone() }}
                    </p>
                }
            } else {
                html! {
                    <>
                        <textarea
                            class="notes-input"
                            value={(*draft).clone()}
                            oninput={on_input}
                            disabled={*saving}
                            rows="4"
                        />
                        <div class="notes-actions">
                            <button
                                class="btn btn-primary"
                                onclick={on_save}
                                disabled={*saving || *draft == saved}
                            >
                                {if *saving { "Enregistrement..." } else { "Enregistrer les notes" }}
                            </button>
                            {match &*status {
                                Some(Ok(())) => html! { <span class="notes-saved">{"Enregistré"}</span> },
                                Some(Err(message)) => html! { <span class="form-error">{message.clone()}</span> },
                                None => html! {},
                            }}
                        </div>
                    </>
                }
            }}
            {if let Some(edited_by) = edited_by {
                html! { <p class="notes-meta">{edited_by}</p> }
            } else {
                html! {}
            }}
        </section>
    }
}
