use shared::Session;
use yew::prelude::*;

/// Top-level screens reachable from the header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppView {
    Planning,
    Employees,
    Backup,
}

impl AppView {
    fn label(&self) -> &'static str {
        match self {
            AppView::Planning => "Planning",
            AppView::Employees => "Employés",
            AppView::Backup => "Sauvegarde",
        }
    }

    /// Screens the session may open, in menu order
    pub fn available(session: &Session) -> Vec<AppView> {
        let mut views = vec![AppView::Planning];
        if session.can_manage_employees() {
            views.push(AppView::Employees);
        }
        if session.can_backup() {
            views.push(AppView::Backup);
        }
        views
    }
}

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub session: Session,
    pub view: AppView,
    pub on_navigate: Callback<AppView>,
    pub on_logout: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let on_logout = {
        let on_logout = props.on_logout.clone();
        Callback::from(move |_: MouseEvent| on_logout.emit(()))
    };

    html! {
        <header class="header">
            <div class="container">
                <h1>{"Planning hebdomadaire"}</h1>
                <nav class="header-nav">
                    {for AppView::available(&props.session).into_iter().map(|view| {
                        let on_navigate = props.on_navigate.clone();
                        let class = if view == props.view { "nav-button active" } else { "nav-button" };
                        html! {
                            <button {class} onclick={Callback::from(move |_: MouseEvent| on_navigate.emit(view))}>
                                {view.label()}
                            </button>
                        }
                    })}
                </nav>
                <div class="header-right">
                    <span class="header-user">
                        {props.session.display_name.clone()}
                        <span class="header-role">
                            {if props.session.is_admin() { " (admin)" } else { "" }}
                        </span>
                    </span>
                    <button class="btn btn-secondary" onclick={on_logout}>{"Déconnexion"}</button>
                </div>
            </div>
        </header>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::Role;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn session(role: Role) -> Session {
        Session {
            role,
            display_name: "Camille".to_string(),
            employee_id: Some(3),
            employee_slug: Some("camille".to_string()),
            token: "tok".to_string(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[wasm_bindgen_test]
    fn test_employee_sees_planning_only() {
        assert_eq!(AppView::available(&session(Role::Employee)), vec![AppView::Planning]);
        assert_eq!(
            AppView::available(&session(Role::Admin)),
            vec![AppView::Planning, AppView::Employees, AppView::Backup]
        );
    }
}
