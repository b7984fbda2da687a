use serde::{Deserialize, Serialize};

/// Что делать с товарами, которые уже есть в каталоге, после подтверждения
/// оператором (`force = true`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMode {
    /// Перезаписать все поля и прибавить остаток
    #[default]
    Overwrite,
    /// Только прибавить остаток, остальные поля не трогать
    IncrementOnly,
}

impl ConflictMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictMode::Overwrite => "overwrite",
            ConflictMode::IncrementOnly => "increment_only",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Some(ConflictMode::Overwrite),
            "increment_only" | "increment-only" | "increment" => {
                Some(ConflictMode::IncrementOnly)
            }
            _ => None,
        }
    }
}

/// Параметры запуска импорта (поля multipart-формы кроме самого файла)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Оператор подтвердил импорт, несмотря на дубликаты
    #[serde(default)]
    pub force: bool,

    /// Учитывается только при `force = true`
    #[serde(default)]
    pub mode: ConflictMode,
}
