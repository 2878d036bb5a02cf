use anyhow::{anyhow, Result};
use gloo::file::{Blob, ObjectUrl};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::HtmlAnchorElement;

/// Offer `content` to the user as a file download
pub fn download_text(file_name: &str, content: &str, mime_type: &str) -> Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow!("Document indisponible"))?;

    let blob = Blob::new_with_options(content, Some(mime_type));
    let url = ObjectUrl::from(blob);

    let anchor = document
        .create_element("a")
        .map_err(|_| anyhow!("Impossible de créer le lien de téléchargement"))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| anyhow!("Impossible de créer le lien de téléchargement"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    // The URL must outlive the click handling
    Timeout::new(1_000, move || drop(url)).forget();
    Ok(())
}

/// Text content of a file picked in an `<input type="file">`
pub async fn read_file_text(file: web_sys::File) -> Result<String> {
    let file = gloo::file::File::from(file);
    gloo::file::futures::read_as_text(&file)
        .await
        .map_err(|e| anyhow!("Lecture du fichier impossible : {}", e))
}
