//! Генерация бизнес-кода поставщика из наименования
//!
//! "PT. Gula Manis" -> "PTGUL"; при коллизии в пределах места хранения
//! добавляется числовой суффикс: "PTGUL1", "PTGUL2", ...

use std::collections::HashSet;

/// Максимальная длина базового кода (без суффикса)
pub const BASE_CODE_LEN: usize = 5;

/// Код для наименования без букв и цифр
pub const FALLBACK_CODE: &str = "SUP";

/// Базовый код: только буквы/цифры ASCII, верхний регистр, первые 5 символов
pub fn derive_base_code(name: &str) -> String {
    let code: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .take(BASE_CODE_LEN)
        .collect();
    if code.is_empty() {
        FALLBACK_CODE.to_string()
    } else {
        code
    }
}

/// n-й кандидат: 0 -> базовый код, далее базовый код + n
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, attempt)
    }
}

/// Первый свободный кандидат относительно уже занятых кодов
pub fn first_free_code(base: &str, taken: &HashSet<String>) -> String {
    (0u32..)
        .map(|attempt| candidate(base, attempt))
        .find(|code| !taken.contains(code))
        .unwrap_or_else(|| base.to_string())
}
