// ==========================================
// Message catalogue (i18n)
// ==========================================
// Backed by rust-i18n, catalogues under locales/
// Locales: es (default), en
// Note: rust_i18n::i18n! is invoked in lib.rs
// ==========================================

/// Environment variable that selects the startup locale.
pub const LOCALE_ENV: &str = "TECNOVA_LOCALE";

/// Current locale code.
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Switches the process-wide locale ("es" or "en").
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Locale used when `TECNOVA_LOCALE` is unset or blank.
pub const DEFAULT_LOCALE: &str = "es";

/// Applies `TECNOVA_LOCALE`, falling back to Spanish.
///
/// rust-i18n starts out in "en", so this must run before any
/// message is rendered.
pub fn init_from_env() {
    let requested = std::env::var(LOCALE_ENV).unwrap_or_default();
    let locale = match requested.trim() {
        "" => DEFAULT_LOCALE,
        other => other,
    };
    set_locale(locale);
}

/// Translates a key without arguments.
///
/// # Example
/// ```no_run
/// use tecnova_pos::i18n::t;
/// let msg = t("import.missing_file");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translates a key and substitutes `%{name}` placeholders.
///
/// # Example
/// ```no_run
/// use tecnova_pos::i18n::t_with_args;
/// let msg = t_with_args("row.name_too_long", &[("max", "120")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
