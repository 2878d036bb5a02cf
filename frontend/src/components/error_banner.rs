use yew::prelude::*;

use crate::hooks::use_planning::Banner;

#[derive(Properties, PartialEq)]
pub struct ErrorBannerProps {
    pub banner: Option<Banner>,
    pub on_dismiss: Callback<()>,
    pub on_retry: Callback<()>,
}

#[function_component(ErrorBanner)]
pub fn error_banner(props: &ErrorBannerProps) -> Html {
    let Some(banner) = &props.banner else {
        return html! {};
    };

    let on_dismiss = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };
    let on_retry = {
        let on_retry = props.on_retry.clone();
        Callback::from(move |_: MouseEvent| on_retry.emit(()))
    };

    html! {
        <div class="error-banner" role="alert">
            <span class="error-banner-message">{banner.message.clone()}</span>
            <div class="error-banner-actions">
                {if banner.retryable {
                    html! { <button class="btn btn-secondary" onclick={on_retry}>{"Réessayer"}</button> }
                } else {
                    html! {}
                }}
                <button class="btn btn-link" onclick={on_dismiss} title="Fermer">{"✕"}</button>
            </div>
        </div>
    }
}
