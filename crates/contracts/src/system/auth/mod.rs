use serde::{Deserialize, Serialize};

/// Роль пользователя POS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    /// Сотрудник склада (gudang)
    Warehouse,
    Cashier,
}

impl UserRole {
    /// Роли, которым разрешён массовый импорт каталога
    pub const CATALOG_IMPORTERS: [UserRole; 2] = [UserRole::Admin, UserRole::Warehouse];

    pub fn can_import_catalog(&self) -> bool {
        Self::CATALOG_IMPORTERS.contains(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user_id
    pub username: String,
    pub role: UserRole,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_import_roles() {
        assert!(UserRole::Admin.can_import_catalog());
        assert!(UserRole::Warehouse.can_import_catalog());
        assert!(!UserRole::Cashier.can_import_catalog());
    }
}
