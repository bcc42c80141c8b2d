use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

pub const MAX_COMMENT_LENGTH: usize = 2000;

/// What a comment is attached to. Painting comments and post comments live
/// in separate tables with the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentTarget {
    Painting,
    Post,
}

impl CommentTarget {
    pub fn table(self) -> &'static str {
        match self {
            CommentTarget::Painting => "comments",
            CommentTarget::Post => "post_comments",
        }
    }

    pub fn target_column(self) -> &'static str {
        match self {
            CommentTarget::Painting => "painting_id",
            CommentTarget::Post => "post_id",
        }
    }

    pub fn parent_table(self) -> &'static str {
        match self {
            CommentTarget::Painting => "paintings",
            CommentTarget::Post => "posts",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommentTarget::Painting => "Painting",
            CommentTarget::Post => "Post",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub target: CommentTarget,
    pub target_id: Uuid,
    pub user_id: Uuid,
    pub author: CommentAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

impl Comment {
    /// Authors may delete their own comments; admins may delete any.
    pub fn can_be_deleted_by(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id
    }
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("Comment cannot be empty".to_string());
        }

        if self.content.trim().chars().count() > MAX_COMMENT_LENGTH {
            return Err(format!("Comment cannot exceed {} characters", MAX_COMMENT_LENGTH));
        }

        Ok(())
    }

    pub fn get_normalized_content(&self) -> String {
        self.content.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(user_id: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            target: CommentTarget::Painting,
            target_id: Uuid::new_v4(),
            user_id,
            author: CommentAuthor {
                name: "Visitor".to_string(),
                image_url: None,
            },
            content: "Lovely colours".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_comment_request_validation() {
        let ok = CreateCommentRequest { content: "  Beautiful!  ".to_string() };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.get_normalized_content(), "Beautiful!");

        let empty = CreateCommentRequest { content: "   ".to_string() };
        assert!(empty.validate().is_err());

        let long = CreateCommentRequest { content: "a".repeat(MAX_COMMENT_LENGTH + 1) };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_comment_deletion_rights() {
        let author = Uuid::new_v4();
        let comment = comment(author);

        assert!(comment.can_be_deleted_by(author, false));
        assert!(comment.can_be_deleted_by(Uuid::new_v4(), true));
        assert!(!comment.can_be_deleted_by(Uuid::new_v4(), false));
    }

    #[test]
    fn test_target_tables() {
        assert_eq!(CommentTarget::Painting.table(), "comments");
        assert_eq!(CommentTarget::Post.table(), "post_comments");
        assert_eq!(CommentTarget::Post.target_column(), "post_id");
        assert_eq!(CommentTarget::Painting.parent_table(), "paintings");
    }

    #[test]
    fn test_comment_serialization() {
        let json = serde_json::to_value(comment(Uuid::new_v4())).expect("serializable");
        assert_eq!(json["target"], "painting");
        assert_eq!(json["author"]["name"], "Visitor");
    }
}
