//! Lightweight i18n translation registry.
//!
//! Provides a centralized, static translation map keyed by `(locale, message_key)`
//! for default alert messages, plus the fixed table that maps localized sensor
//! labels onto canonical signal names. Supported locales: `en`, `zh-CN`.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Default locale when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// Supported locales.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh-CN"];

/// Central translation registry.
pub struct Translations {
    map: HashMap<(&'static str, &'static str), &'static str>,
}

impl Translations {
    /// Get a translated string for the given locale and key.
    /// Falls back to `en` if the locale is not found, then to the provided default.
    pub fn get<'a>(&self, locale: &str, key: &str, default: &'a str) -> &'a str {
        if let Some(&val) = self.map.get(&(locale, key)) {
            return val;
        }
        if locale != "en" {
            if let Some(&val) = self.map.get(&("en", key)) {
                return val;
            }
        }
        default
    }
}

/// Global translation singleton.
pub static TRANSLATIONS: LazyLock<Translations> = LazyLock::new(|| {
    let mut map = HashMap::new();

    macro_rules! t {
        ($locale:expr, $key:expr, $val:expr) => {
            map.insert(($locale, $key), $val);
        };
    }

    // ---- Default alert messages ----

    t!(
        "en",
        "alert.threshold",
        "{name}: {field} = {value} (threshold: {op} {target})"
    );
    t!(
        "zh-CN",
        "alert.threshold",
        "{name}: {field} = {value}（阈值: {op} {target}）"
    );

    t!(
        "en",
        "alert.range",
        "{name}: {field} = {value} (range: {min} - {max}, {mode})"
    );
    t!(
        "zh-CN",
        "alert.range",
        "{name}: {field} = {value}（范围: {min} - {max}，{mode}）"
    );

    t!("en", "alert.trend", "{name}: {field} trend is {direction}");
    t!("zh-CN", "alert.trend", "{name}: {field} 趋势为{direction}");

    t!("en", "alert.composite", "{name}: multiple conditions triggered");
    t!("zh-CN", "alert.composite", "{name}: 多个条件同时触发");

    // ---- Condition vocabulary ----

    t!("en", "trend.increasing", "increasing");
    t!("zh-CN", "trend.increasing", "上升");
    t!("en", "trend.decreasing", "decreasing");
    t!("zh-CN", "trend.decreasing", "下降");
    t!("en", "trend.stable", "stable");
    t!("zh-CN", "trend.stable", "平稳");

    t!("en", "range.inside", "inside");
    t!("zh-CN", "range.inside", "区间内");
    t!("en", "range.outside", "outside");
    t!("zh-CN", "range.outside", "区间外");

    Translations { map }
});

/// Localized sensor labels and the canonical signal name each one maps to.
static SIGNAL_LABELS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // zh-CN
        ("温度", "temperature"),
        ("振动", "vibration"),
        ("压力", "pressure"),
        ("湿度", "humidity"),
        ("电流", "current"),
        ("电压", "voltage"),
        ("转速", "speed"),
        ("效率", "efficiency"),
        ("设备综合效率", "oee"),
        ("可用率", "availability"),
        ("性能", "performance"),
        ("质量", "quality"),
        // pt-BR
        ("temperatura", "temperature"),
        ("vibracao", "vibration"),
        ("vibração", "vibration"),
        ("pressao", "pressure"),
        ("pressão", "pressure"),
        ("umidade", "humidity"),
        ("corrente", "current"),
        ("tensao", "voltage"),
        ("tensão", "voltage"),
        ("velocidade", "speed"),
        ("eficiencia", "efficiency"),
        ("eficiência", "efficiency"),
        ("disponibilidade", "availability"),
        ("desempenho", "performance"),
        ("qualidade", "quality"),
    ])
});

/// Translate a localized sensor label into its canonical signal name.
///
/// Returns `None` for labels that are already canonical or unknown.
///
/// # Examples
///
/// ```
/// use telemon_common::i18n::canonical_signal;
///
/// assert_eq!(canonical_signal("温度"), Some("temperature"));
/// assert_eq!(canonical_signal("Temperatura"), Some("temperature"));
/// assert_eq!(canonical_signal("temperature"), None);
/// ```
pub fn canonical_signal(label: &str) -> Option<&'static str> {
    let trimmed = label.trim();
    SIGNAL_LABELS
        .get(trimmed)
        .or_else(|| SIGNAL_LABELS.get(trimmed.to_lowercase().as_str()))
        .copied()
}
