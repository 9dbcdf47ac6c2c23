use super::escape;
use crate::canva::tokens::mask_token;
use crate::canva::TokenResponse;

/// Summary page shown after a successful token exchange
pub fn render_token_summary(tokens: &TokenResponse) -> String {
    let refresh = tokens
        .refresh_token
        .as_deref()
        .map(mask_token)
        .unwrap_or_else(|| "(none)".to_string());
    let expires_in = tokens
        .expires_in
        .map(|secs| format!("{secs}s"))
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "\n<pre>✅ Tokens acquired!\n\n\
         access_token: {access}\n\
         refresh_token: {refresh}\n\
         expires_in: {expires_in}\n\n\
         Tokens are cached by this server. To keep them across restarts copy them into\n\
         CANVA_ACCESS_TOKEN and CANVA_REFRESH_TOKEN.\n</pre>",
        access = escape(&mask_token(&tokens.access_token)),
        refresh = escape(&refresh),
    )
}
