use tracing::debug;

use crate::database::repo::PixivDatabase;
use crate::error::{ReconcileError, Result};
use crate::tagging::sanitizer::sanitize_tag;
use crate::tagging::tag_set::TagSet;

const FILENAME_MARKER: &str = "pixiv_";

/// Title, summary and tags derived for one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub image_id: i64,
    pub title: String,
    pub summary: String,
    pub tags: TagSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedMetadata),
    /// The database has no image row for this archive.
    NoMetadata { image_id: i64 },
}

/// Extracts the pixiv image id from filenames like `pixiv_12345_p0.jpg`.
pub fn parse_image_id(filename: &str) -> Option<i64> {
    let (_, rest) = filename.split_once(FILENAME_MARKER)?;
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(idx, _)| idx);
    rest[..digits_end].parse().ok()
}

pub struct MetadataResolver<'a> {
    db: &'a PixivDatabase,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(db: &'a PixivDatabase) -> Self {
        Self { db }
    }

    pub fn resolve(&self, arcid: &str, archive_tags: &str, filename: &str) -> Result<Resolution> {
        let image_id = parse_image_id(filename).ok_or_else(|| ReconcileError::BadFilename {
            arcid: arcid.to_string(),
            filename: filename.to_string(),
        })?;

        let Some(image) = self.db.find_image(image_id)? else {
            return Ok(Resolution::NoMetadata { image_id });
        };

        // Existing server tags (usually just date_added) are carried over.
        let mut tags = TagSet::from_tag_string(archive_tags);
        tags.insert(format!("source:https://pixiv.net/artworks/{}", image.image_id));
        tags.insert(format!("pixiv_user_id:{}", image.member_id));

        let member = self
            .db
            .find_member(image.member_id)?
            .ok_or_else(|| ReconcileError::MissingMember {
                arcid: arcid.to_string(),
                image_id,
                member_id: image.member_id,
            })?;
        tags.insert(format!("artist:{}", sanitize_tag(&member.name)));

        for tag_id in self.db.tag_ids_for_image(image_id)? {
            tags.insert(sanitize_tag(&tag_id));
            if let Some(translation) = self.db.english_translation(&tag_id)? {
                tags.insert(sanitize_tag(&translation));
            }
        }

        if let Some(dates) = self.db.date_info(image_id)? {
            tags.insert(format!("date_created:{}", dates.created_epoch));
            tags.insert(format!("date_uploaded:{}", dates.uploaded_epoch));
        }

        debug!("[{}] resolved {} tags from pixiv image {}", arcid, tags.len(), image_id);

        Ok(Resolution::Resolved(ResolvedMetadata {
            image_id,
            title: image.title,
            summary: image.caption,
            tags,
        }))
    }
}
