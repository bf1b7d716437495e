//! In-memory store for uploaded images and their tags.
//!
//! The gallery owns the session's `TaggedImage` records in upload order.
//! Nothing here is persisted; closing the app discards the collection.

use crate::model::{Tag, TaggedImage};

/// Ordered collection of uploaded images.
#[derive(Debug, Default)]
pub struct Gallery {
    images: Vec<TaggedImage>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[TaggedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, image_id: &str) -> Option<&TaggedImage> {
        self.images.iter().find(|img| img.id == image_id)
    }

    /// Append a batch of newly ingested images. Uploads accumulate; earlier
    /// images are never replaced.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = TaggedImage>) {
        self.images.extend(batch);
    }

    /// Append `tag` to the identified image.
    ///
    /// Unknown ids are a silent no-op (the image may have been removed while
    /// a tag popup was open). Empty names are refused; callers are expected
    /// to trim before committing. Returns whether the tag was stored.
    pub fn add_tag(&mut self, image_id: &str, tag: Tag) -> bool {
        if tag.name.is_empty() {
            tracing::warn!(image_id, "refusing to store tag with empty name");
            return false;
        }
        match self.images.iter_mut().find(|img| img.id == image_id) {
            Some(img) => {
                img.tags.push(tag);
                true
            }
            None => {
                tracing::warn!(image_id, "add_tag for unknown image id ignored");
                false
            }
        }
    }

    /// Remove the identified image together with all its tags. The remaining
    /// images keep their relative order. Returns whether anything was removed.
    pub fn remove_image(&mut self, image_id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.id != image_id);
        before != self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> TaggedImage {
        TaggedImage::new(name, "image/png", vec![0], "AA==".to_string())
    }

    #[test]
    fn test_extend_accumulates_across_batches() {
        let mut gallery = Gallery::new();
        gallery.extend(vec![image("a.png"), image("b.png")]);
        gallery.extend(vec![image("c.png")]);
        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.images()[2].file_name, "c.png");
    }

    #[test]
    fn test_add_tag_appends_in_order() {
        let mut gallery = Gallery::new();
        gallery.extend(vec![image("a.png")]);
        let id = gallery.images()[0].id.clone();

        assert!(gallery.add_tag(&id, Tag::new(10, 20, "Alice")));
        assert!(gallery.add_tag(&id, Tag::new(30, 40, "Bob")));

        let tags = &gallery.get(&id).unwrap().tags;
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "Alice");
        assert_eq!(tags[1].name, "Bob");
    }

    #[test]
    fn test_add_tag_unknown_id_is_noop() {
        let mut gallery = Gallery::new();
        gallery.extend(vec![image("a.png")]);

        assert!(!gallery.add_tag("no-such-id", Tag::new(1, 1, "Alice")));
        assert!(gallery.images()[0].tags.is_empty());
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_add_tag_refuses_empty_name() {
        let mut gallery = Gallery::new();
        gallery.extend(vec![image("a.png")]);
        let id = gallery.images()[0].id.clone();

        assert!(!gallery.add_tag(&id, Tag::new(1, 1, "")));
        assert!(gallery.get(&id).unwrap().tags.is_empty());
    }

    #[test]
    fn test_remove_image_is_stable_and_atomic() {
        let mut gallery = Gallery::new();
        gallery.extend(vec![image("a.png"), image("b.png"), image("c.png")]);
        let middle = gallery.images()[1].id.clone();
        gallery.add_tag(&middle, Tag::new(5, 5, "Alice"));

        assert!(gallery.remove_image(&middle));
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.images()[0].file_name, "a.png");
        assert_eq!(gallery.images()[1].file_name, "c.png");
        assert!(gallery.get(&middle).is_none());

        // Removing again is a no-op.
        assert!(!gallery.remove_image(&middle));
    }
}
