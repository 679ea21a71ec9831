//! Composer: error banner, text input, file picker, microphone toggle and send button.

use super::html::{disabled_attr, escape};

/// Everything the composer depends on.
#[derive(Clone, Copy, Debug)]
pub struct ComposerProps<'a> {
    /// A webhook call is in flight.
    pub loading: bool,
    /// A chat is selected.
    pub has_chat: bool,
    /// Microphone indicator.
    pub recording: bool,
    /// Last connection error.
    pub error: Option<&'a str>,
}

/// Render the composer.
#[must_use]
pub fn render(props: &ComposerProps<'_>) -> String {
    let mut out = String::from("<footer class=\"composer\">\n");

    if let Some(error) = props.error {
        out.push_str(&format!(
            "<div class=\"error-banner\">Erreur: {}</div>\n",
            escape(error)
        ));
    }

    let inputs_disabled = disabled_attr(props.loading || !props.has_chat);
    let mic_class = if props.recording { " recording" } else { "" };
    let mic_label = if props.recording {
        "Arrêter l&#39;enregistrement"
    } else {
        "Commencer l&#39;enregistrement"
    };
    let mic_disabled = disabled_attr(props.loading);

    out.push_str(&format!(
        r#"<div class="composer-row">
  <form method="post" action="/messages" id="composer-form" class="grow">
    <textarea name="message" id="composer-input" rows="1" placeholder="Tapez votre message..." aria-label="Saisie de message"{inputs_disabled}></textarea>
  </form>
  <form method="post" action="/files" id="file-form" class="inline">
    <input type="hidden" name="file_name">
    <input type="hidden" name="file_size">
    <input type="hidden" name="file_type">
    <input type="file" id="file-input" class="hidden" accept="*/*">
    <button type="button" id="file-button" class="round" aria-label="Télécharger un fichier"{inputs_disabled}>📎</button>
  </form>
  <form method="post" action="/recording/toggle" class="inline">
    <button type="submit" class="round{mic_class}" aria-label="{mic_label}"{mic_disabled}>🎤</button>
  </form>
  <button type="submit" form="composer-form" id="send-button" class="round send" aria-label="Envoyer le message" disabled>➤</button>
</div>
</footer>
"#
    ));
    out
}
