use std::path::Path;

use anyhow::Context;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::database::schema::{REQUIRED_TABLES, TABLE_EXISTS_QUERY};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub image_id: i64,
    pub member_id: i64,
    pub title: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMember {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDateInfo {
    pub created_epoch: i64,
    pub uploaded_epoch: i64,
}

/// Read-only view over a PixivUtil2 SQLite database.
pub struct PixivDatabase {
    conn: Connection,
}

impl PixivDatabase {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database: {:?}", path))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Names from [`REQUIRED_TABLES`] that the database does not define.
    pub fn missing_tables(&self) -> Result<Vec<&'static str>> {
        let mut stmt = self.conn.prepare_cached(TABLE_EXISTS_QUERY)?;
        let mut missing = Vec::new();
        for table in REQUIRED_TABLES {
            let found: Option<String> = stmt
                .query_row(params![table], |row| row.get(0))
                .optional()?;
            if found.is_none() {
                missing.push(table);
            }
        }
        Ok(missing)
    }

    pub fn find_image(&self, image_id: i64) -> Result<Option<SourceImage>> {
        let image = self
            .conn
            .prepare_cached(
                "SELECT image_id, member_id, title, caption FROM pixiv_master_image WHERE image_id = ?1",
            )?
            .query_row(params![image_id], |row| {
                Ok(SourceImage {
                    image_id: row.get(0)?,
                    member_id: row.get(1)?,
                    title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    caption: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })
            .optional()?;
        Ok(image)
    }

    pub fn find_member(&self, member_id: i64) -> Result<Option<SourceMember>> {
        let member = self
            .conn
            .prepare_cached("SELECT name FROM pixiv_master_member WHERE member_id = ?1")?
            .query_row(params![member_id], |row| {
                Ok(SourceMember {
                    name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                })
            })
            .optional()?;
        Ok(member)
    }

    /// Raw tag ids linked to an image, in link-table order.
    pub fn tag_ids_for_image(&self, image_id: i64) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT tag_id FROM pixiv_image_to_tag WHERE image_id = ?1")?;
        let rows = stmt.query_map(params![image_id], |row| row.get::<_, String>(0))?;
        let tag_ids = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tag_ids)
    }

    pub fn english_translation(&self, tag_id: &str) -> Result<Option<String>> {
        let translation = self
            .conn
            .prepare_cached(
                "SELECT translation FROM pixiv_tag_translation WHERE translation_type = 'en' AND tag_id = ?1",
            )?
            .query_row(params![tag_id], |row| row.get::<_, Option<String>>(0))
            .optional()?;
        Ok(translation.flatten())
    }

    pub fn date_info(&self, image_id: i64) -> Result<Option<SourceDateInfo>> {
        let info = self
            .conn
            .prepare_cached(
                "SELECT created_date_epoch, uploaded_date_epoch FROM pixiv_date_info WHERE image_id = ?1",
            )?
            .query_row(params![image_id], |row| {
                Ok(SourceDateInfo {
                    created_epoch: epoch_column(row, 0)?,
                    uploaded_epoch: epoch_column(row, 1)?,
                })
            })
            .optional()?;
        Ok(info)
    }
}

/// PixivUtil2 has stored epochs as INTEGER, REAL and TEXT over its lifetime.
fn epoch_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    let invalid = || {
        rusqlite::Error::InvalidColumnType(
            idx,
            "epoch".to_string(),
            rusqlite::types::Type::Text,
        )
    };
    match row.get_ref(idx)? {
        ValueRef::Integer(value) => Ok(value),
        ValueRef::Real(value) => Ok(value.trunc() as i64),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|_| invalid())?.trim();
            text.parse::<i64>()
                .or_else(|_| text.parse::<f64>().map(|v| v.trunc() as i64))
                .map_err(|_| invalid())
        }
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "epoch".to_string(),
            other.data_type(),
        )),
    }
}

/// Builders for in-memory PixivUtil2 databases.
#[cfg(test)]
pub mod fixture {
    use rusqlite::{params, Connection};

    use super::PixivDatabase;
    use crate::database::schema::FIXTURE_SCHEMA;

    pub struct FixtureBuilder {
        conn: Connection,
    }

    impl FixtureBuilder {
        pub fn new() -> rusqlite::Result<Self> {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(FIXTURE_SCHEMA)?;
            Ok(Self { conn })
        }

        pub fn image(self, image_id: i64, member_id: i64, title: &str, caption: &str) -> rusqlite::Result<Self> {
            self.conn.execute(
                "INSERT INTO pixiv_master_image (image_id, member_id, title, caption) VALUES (?1, ?2, ?3, ?4)",
                params![image_id, member_id, title, caption],
            )?;
            Ok(self)
        }

        pub fn member(self, member_id: i64, name: &str) -> rusqlite::Result<Self> {
            self.conn.execute(
                "INSERT INTO pixiv_master_member (member_id, name) VALUES (?1, ?2)",
                params![member_id, name],
            )?;
            Ok(self)
        }

        pub fn tag(self, image_id: i64, tag_id: &str) -> rusqlite::Result<Self> {
            self.conn.execute(
                "INSERT OR IGNORE INTO pixiv_master_tag (tag_id) VALUES (?1)",
                params![tag_id],
            )?;
            self.conn.execute(
                "INSERT INTO pixiv_image_to_tag (image_id, tag_id) VALUES (?1, ?2)",
                params![image_id, tag_id],
            )?;
            Ok(self)
        }

        pub fn translation(self, tag_id: &str, translation_type: &str, translation: &str) -> rusqlite::Result<Self> {
            self.conn.execute(
                "INSERT INTO pixiv_tag_translation (tag_id, translation_type, translation) VALUES (?1, ?2, ?3)",
                params![tag_id, translation_type, translation],
            )?;
            Ok(self)
        }

        pub fn dates(self, image_id: i64, created: i64, uploaded: i64) -> rusqlite::Result<Self> {
            self.conn.execute(
                "INSERT INTO pixiv_date_info (image_id, created_date_epoch, uploaded_date_epoch) VALUES (?1, ?2, ?3)",
                params![image_id, created, uploaded],
            )?;
            Ok(self)
        }

        pub fn execute(self, sql: &str) -> rusqlite::Result<Self> {
            self.conn.execute_batch(sql)?;
            Ok(self)
        }

        pub fn build(self) -> PixivDatabase {
            PixivDatabase::from_connection(self.conn)
        }
    }
}
