pub fn redact_url_password(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("***")).is_err() {
                return raw.to_string();
            }
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}
