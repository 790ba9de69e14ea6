/// Database row types that map directly to SQLite rows.
/// Distinct from the dovecote-types wire models to keep the DB layer
/// independent.

pub struct CreatorRow {
    pub id: String,
    pub company_id: String,
    pub handle: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub creator_id: String,
    pub text: String,
    pub tag: String,
    pub product_category: Option<String>,
    pub reviewed: bool,
    pub created_at: String,
}

pub struct ReplyRow {
    pub id: String,
    pub message_id: String,
    pub text: String,
    pub is_public: bool,
    pub created_at: String,
}

pub struct ReactionCountRow {
    pub message_id: String,
    pub count: i64,
}
