use uuid::Uuid;

pub type Id = String;

/// System attribute names used on every stored document.
pub const KEY_FIELD: &str = "_key";
pub const ID_FIELD: &str = "_id";
pub const REV_FIELD: &str = "_rev";
pub const FROM_FIELD: &str = "_from";
pub const TO_FIELD: &str = "_to";

pub fn generate_key() -> Id {
    Uuid::new_v4().to_string()
}

pub fn generate_rev() -> String {
    Uuid::new_v4().simple().to_string()
}
