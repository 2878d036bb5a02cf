use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoginMode {
    Admin,
    Employee,
}

#[derive(Properties, PartialEq)]
pub struct LoginViewProps {
    pub logging_in: bool,
    pub message: Option<String>,
    pub on_admin_login: Callback<String>,
    pub on_employee_login: Callback<String>,
}

#[function_component(LoginView)]
pub fn login_view(props: &LoginViewProps) -> Html {
    let mode = use_state(|| LoginMode::Employee);
    let credential = use_state(String::new);

    let on_input = {
        let credential = credential.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            credential.set(input.value());
        })
    };

    let switch_to = |target: LoginMode| {
        let mode = mode.clone();
        let credential = credential.clone();
        Callback::from(move |_: MouseEvent| {
            mode.set(target);
            credential.set(String::new());
        })
    };

    let on_submit = {
        let mode = mode.clone();
        let credential = credential.clone();
        let on_admin_login = props.on_admin_login.clone();
        let on_employee_login = props.on_employee_login.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let value = (*credential).clone();
            match *mode {
                LoginMode::Admin => on_admin_login.emit(value),
                LoginMode::Employee => on_employee_login.emit(value),
            }
        })
    };

    let (label, input_type, placeholder) = match *mode {
        LoginMode::Admin => ("Code PIN administrateur", "password", "••••"),
        LoginMode::Employee => ("Votre identifiant", "text", "ex. camille-durand"),
    };

    html! {
        <div class="login-view">
            <div class="login-card">
                <h2>{"Connexion"}</h2>
                <div class="login-tabs">
                    <button
                        class={classes!("login-tab", (*mode == LoginMode::Employee).then_some("active"))}
                        onclick={switch_to(LoginMode::Employee)}
                    >
                        {"Employé"}
                    </button>
                    <button
                        class={classes!("login-tab", (*mode == LoginMode::Admin).then_some("active"))}
                        onclick={switch_to(LoginMode::Admin)}
                    >
                        {"Administrateur"}
                    </button>
                </div>

                {if let Some(message) = props.message.clone() {
                    html! { <div class="login-error">{message}</div> }
                } else {
                    html! {}
                }}

                <form class="login-form" onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="login-credential">{label}</label>
                        <input
                            id="login-credential"
                            type={input_type}
                            placeholder={placeholder}
                            value={(*credential).clone()}
                            oninput={on_input}
                            disabled={props.logging_in}
                            autofocus=true
                        />
                    </div>
                    <button type="submit" class="btn btn-primary" disabled={props.logging_in}>
                        {if props.logging_in { "Connexion..." } else { "Se connecter" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
