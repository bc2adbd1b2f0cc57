/// Tables a PixivUtil2 database must carry before a sync run may start.
pub const REQUIRED_TABLES: [&str; 7] = [
    "pixiv_master_image",
    "pixiv_manga_image",
    "pixiv_date_info",
    "pixiv_image_to_tag",
    "pixiv_master_member",
    "pixiv_master_tag",
    "pixiv_tag_translation",
];

pub const TABLE_EXISTS_QUERY: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1";

/// Subset of the PixivUtil2 layout used to build test databases.
#[cfg(test)]
pub const FIXTURE_SCHEMA: &str = "
    CREATE TABLE pixiv_master_member (
        member_id INTEGER PRIMARY KEY,
        name TEXT,
        save_folder TEXT,
        created_date DATE,
        last_update_date DATE,
        last_image INTEGER,
        is_deleted INTEGER DEFAULT 0,
        member_token TEXT
    );

    CREATE TABLE pixiv_master_image (
        image_id INTEGER PRIMARY KEY,
        member_id INTEGER,
        title TEXT,
        save_name TEXT,
        created_date DATE,
        last_update_date DATE,
        is_manga TEXT,
        caption TEXT
    );

    CREATE TABLE pixiv_manga_image (
        image_id INTEGER,
        page INTEGER,
        save_name TEXT,
        created_date DATE,
        last_update_date DATE,
        PRIMARY KEY (image_id, page)
    );

    CREATE TABLE pixiv_master_tag (
        tag_id VARCHAR(255) PRIMARY KEY,
        created_date DATE,
        last_update_date DATE
    );

    CREATE TABLE pixiv_tag_translation (
        tag_id VARCHAR(255),
        translation_type VARCHAR(255),
        translation VARCHAR(255),
        created_date DATE,
        last_update_date DATE,
        PRIMARY KEY (tag_id, translation_type)
    );

    CREATE TABLE pixiv_image_to_tag (
        image_id INTEGER,
        tag_id VARCHAR(255),
        created_date DATE,
        last_update_date DATE,
        PRIMARY KEY (image_id, tag_id)
    );

    CREATE TABLE pixiv_date_info (
        image_id INTEGER PRIMARY KEY,
        created_date_epoch INTEGER,
        uploaded_date_epoch INTEGER
    );
";
