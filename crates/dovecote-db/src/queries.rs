use crate::Database;
use crate::models::{CreatorRow, MessageRow, ReactionCountRow, ReplyRow};
use anyhow::Result;
use dovecote_types::models::MessageTag;
use rusqlite::Connection;

impl Database {
    // -- Creators --

    pub fn create_creator(&self, id: &str, company_id: &str, handle: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO creators (id, company_id, handle) VALUES (?1, ?2, ?3)",
                (id, company_id, handle),
            )?;
            Ok(())
        })
    }

    pub fn get_creator_by_company(&self, company_id: &str) -> Result<Option<CreatorRow>> {
        self.with_conn(|conn| query_creator_by_company(conn, company_id))
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        id: &str,
        creator_id: &str,
        text: &str,
        tag: MessageTag,
        product_category: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, creator_id, text, tag, product_category) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, creator_id, text, tag.as_str(), product_category],
            )?;
            Ok(())
        })
    }

    pub fn list_messages(
        &self,
        creator_id: &str,
        tag: Option<MessageTag>,
        product_category: Option<&str>,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, creator_id, tag, product_category))
    }

    /// Flip the reviewed flag. Returns false when no message with that id
    /// exists for this creator.
    pub fn set_message_reviewed(
        &self,
        creator_id: &str,
        message_id: &str,
        reviewed: bool,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let rows = conn.execute(
                "UPDATE messages SET reviewed = ?3 WHERE id = ?2 AND creator_id = ?1",
                rusqlite::params![creator_id, message_id, reviewed],
            )?;
            Ok(rows > 0)
        })
    }

    /// Delete a message; replies and reactions cascade. Returns false when
    /// no message with that id exists for this creator.
    pub fn delete_message(&self, creator_id: &str, message_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let rows = conn.execute(
                "DELETE FROM messages WHERE id = ?2 AND creator_id = ?1",
                rusqlite::params![creator_id, message_id],
            )?;
            Ok(rows > 0)
        })
    }

    pub fn message_belongs_to_creator(&self, creator_id: &str, message_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM messages WHERE id = ?2 AND creator_id = ?1",
                    rusqlite::params![creator_id, message_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Replies --

    pub fn insert_reply(
        &self,
        id: &str,
        message_id: &str,
        text: &str,
        is_public: bool,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO replies (id, message_id, text, is_public) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, message_id, text, is_public],
            )?;
            Ok(())
        })
    }

    /// Flip a reply's visibility, scoped through the parent message's
    /// creator. Returns false when the reply is not under this creator.
    pub fn set_reply_visibility(
        &self,
        creator_id: &str,
        reply_id: &str,
        is_public: bool,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let rows = conn.execute(
                "UPDATE replies SET is_public = ?3
                 WHERE id = ?2
                   AND message_id IN (SELECT id FROM messages WHERE creator_id = ?1)",
                rusqlite::params![creator_id, reply_id, is_public],
            )?;
            Ok(rows > 0)
        })
    }

    /// Batch-fetch replies for a set of message IDs, oldest first.
    pub fn replies_for_messages(&self, message_ids: &[String]) -> Result<Vec<ReplyRow>> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, message_id, text, is_public, created_at FROM replies
                 WHERE message_id IN ({})
                 ORDER BY created_at ASC, rowid ASC",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = message_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(ReplyRow {
                        id: row.get(0)?,
                        message_id: row.get(1)?,
                        text: row.get(2)?,
                        is_public: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Reactions --

    pub fn insert_reaction(&self, id: &str, message_id: &str, user_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO reactions (id, message_id, user_hash) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, message_id, user_hash],
            )?;
            Ok(())
        })
    }

    /// Batch-fetch reaction counts for a set of message IDs. Messages with
    /// no reactions produce no row.
    pub fn reaction_counts_for_messages(
        &self,
        message_ids: &[String],
    ) -> Result<Vec<ReactionCountRow>> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT message_id, COUNT(*) FROM reactions
                 WHERE message_id IN ({})
                 GROUP BY message_id",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = message_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(ReactionCountRow {
                        message_id: row.get(0)?,
                        count: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Reaction count for one message, plus whether `user_hash` has reacted.
    pub fn reaction_summary(
        &self,
        message_id: &str,
        user_hash: Option<&str>,
    ) -> Result<(u64, bool)> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM reactions WHERE message_id = ?1",
                [message_id],
                |row| row.get(0),
            )?;

            let reacted = match user_hash {
                Some(hash) => conn
                    .query_row(
                        "SELECT 1 FROM reactions WHERE message_id = ?1 AND user_hash = ?2",
                        rusqlite::params![message_id, hash],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some(),
                None => false,
            };

            Ok((count as u64, reacted))
        })
    }

    // -- Creator feedback --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_creator_feedback(
        &self,
        id: &str,
        creator_id: &str,
        company_id: &str,
        user_id: &str,
        category: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO creator_feedback (id, creator_id, company_id, user_id, category, subject, message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, creator_id, company_id, user_id, category, subject, message],
            )?;
            Ok(())
        })
    }
}

fn query_creator_by_company(conn: &Connection, company_id: &str) -> Result<Option<CreatorRow>> {
    let mut stmt = conn
        .prepare("SELECT id, company_id, handle, created_at FROM creators WHERE company_id = ?1")?;

    let row = stmt
        .query_row([company_id], |row| {
            Ok(CreatorRow {
                id: row.get(0)?,
                company_id: row.get(1)?,
                handle: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_messages(
    conn: &Connection,
    creator_id: &str,
    tag: Option<MessageTag>,
    product_category: Option<&str>,
) -> Result<Vec<MessageRow>> {
    let mut sql = String::from(
        "SELECT id, creator_id, text, tag, product_category, reviewed, created_at
         FROM messages
         WHERE creator_id = ?1",
    );
    let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&creator_id];

    let tag_value = tag.map(|t| t.as_str());
    if let Some(ref value) = tag_value {
        sql.push_str(&format!(" AND tag = ?{}", params.len() + 1));
        params.push(value);
    }
    if let Some(ref value) = product_category {
        sql.push_str(&format!(" AND product_category = ?{}", params.len() + 1));
        params.push(value);
    }

    // rowid breaks ties between same-second inserts
    sql.push_str(" ORDER BY created_at DESC, rowid DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                creator_id: row.get(1)?,
                text: row.get(2)?,
                tag: row.get(3)?,
                product_category: row.get(4)?,
                reviewed: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
