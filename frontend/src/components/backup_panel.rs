use shared::{ApiError, BackupPayload};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::services::date_utils::today;
use crate::services::download::{download_text, read_file_text};
use crate::services::{ApiClient, Logger};

#[derive(Properties, PartialEq)]
pub struct BackupPanelProps {
    pub api: ApiClient,
    pub on_auth_error: Callback<String>,
    /// Called once the server accepted a restore
    pub on_restored: Callback<()>,
}

#[derive(Clone, PartialEq)]
enum Status {
    Idle,
    Working(&'static str),
    Done(String),
    Failed(String),
}

#[function_component(BackupPanel)]
pub fn backup_panel(props: &BackupPanelProps) -> Html {
    let status = use_state(|| Status::Idle);
    let file_ref = use_node_ref();
    let confirming = use_state(|| false);

    let report = {
        let status = status.clone();
        let on_auth_error = props.on_auth_error.clone();
        move |error: ApiError| {
            if error.is_auth() {
                on_auth_error.emit(error.to_string());
            } else {
                status.set(Status::Failed(error.to_string()));
            }
        }
    };

    let on_backup = {
        let api = props.api.clone();
        let status = status.clone();
        let report = report.clone();
        Callback::from(move |_: MouseEvent| {
            let api = api.clone();
            let status = status.clone();
            let report = report.clone();
            status.set(Status::Working("Export en cours..."));
            spawn_local(async move {
                let payload = match api.backup().await {
                    Ok(payload) => payload,
                    Err(e) => {
                        Logger::warn_with_component("backup", &format!("Backup failed: {}", e));
                        report(e);
                        return;
                    }
                };
                let file_name = BackupPayload::file_name(today());
                let saved = payload
                    .to_pretty_json()
                    .map_err(anyhow::Error::from)
                    .and_then(|text| download_text(&file_name, &text, "application/json"));
                match saved {
                    Ok(()) => {
                        Logger::info_with_component("backup", &format!("Exported {}", file_name));
                        status.set(Status::Done(format!("Sauvegarde téléchargée : {}", file_name)));
                    }
                    Err(e) => status.set(Status::Failed(e.to_string())),
                }
            });
        })
    };

    let ask_restore = {
        let confirming = confirming.clone();
        let file_ref = file_ref.clone();
        let status = status.clone();
        Callback::from(move |_: MouseEvent| {
            let has_file = file_ref
                .cast::<HtmlInputElement>()
                .and_then(|input| input.files())
                .map_or(false, |files| files.length() > 0);
            if has_file {
                confirming.set(true);
            } else {
                status.set(Status::Failed("Choisissez un fichier de sauvegarde".to_string()));
            }
        })
    };

    let on_restore = {
        let api = props.api.clone();
        let status = status.clone();
        let confirming = confirming.clone();
        let file_ref = file_ref.clone();
        let on_restored = props.on_restored.clone();
        Callback::from(move |_: MouseEvent| {
            confirming.set(false);
            let Some(file) = file_ref
                .cast::<HtmlInputElement>()
                .and_then(|input| input.files())
                .and_then(|files| files.get(0))
            else {
                return;
            };
            let api = api.clone();
            let status = status.clone();
            let report = report.clone();
            let on_restored = on_restored.clone();
            status.set(Status::Working("Restauration en cours..."));
            spawn_local(async move {
                let payload = match read_file_text(file)
                    .await
                    .and_then(|text| BackupPayload::from_file_text(&text).map_err(anyhow::Error::from))
                {
                    Ok(payload) => payload,
                    Err(e) => {
                        status.set(Status::Failed(e.to_string()));
                        return;
                    }
                };
                match api.restore(&payload).await {
                    Ok(response) => {
                        Logger::info_with_component("backup", "Restore accepted");
                        let detail = if response.detail.is_empty() {
                            "Restauration terminée".to_string()
                        } else {
                            response.detail
                        };
                        status.set(Status::Done(detail));
                        on_restored.emit(());
                    }
                    Err(e) => {
                        Logger::warn_with_component("backup", &format!("Restore failed: {}", e));
                        report(e);
                    }
                }
            });
        })
    };

    let cancel_restore = {
        let confirming = confirming.clone();
        Callback::from(move |_: MouseEvent| confirming.set(false))
    };

    let working = matches!(*status, Status::Working(_));

    html! {
        <section class="backup-panel">
            <h2>{"Sauvegarde"}</h2>

            <div class="backup-block">
                <p>{"Télécharge l'ensemble des employés et des plannings au format JSON."}</p>
                <button class="btn btn-primary" onclick={on_backup} disabled={working}>
                    {"Télécharger une sauvegarde"}
                </button>
            </div>

            <div class="backup-block">
                <p>{"Remplace toutes les données par celles d'un fichier de sauvegarde."}</p>
                <input ref={file_ref} type="file" accept="application/json,.json" disabled={working} />
                {if *confirming {
                    html! {
                        <div class="confirm-box">
                            <span>{"Toutes les données actuelles seront remplacées. Continuer ?"}</span>
                            <button class="btn btn-danger" onclick={on_restore}>{"Restaurer"}</button>
                            <button class="btn btn-secondary" onclick={cancel_restore}>{"Annuler"}</button>
                        </div>
                    }
                } else {
                    html! {
                        <button class="btn btn-danger" onclick={ask_restore} disabled={working}>
                            {"Restaurer"}
                        </button>
                    }
                }}
            </div>

            {match &*status {
                Status::Idle => html! {},
                Status::Working(label) => html! { <p class="loading">{*label}</p> },
                Status::Done(message) => html! { <p class="backup-done">{message.clone()}</p> },
                Status::Failed(message) => html! { <p class="form-error">{message.clone()}</p> },
            }}
        </section>
    }
}
