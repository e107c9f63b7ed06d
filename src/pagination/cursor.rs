use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use bson::Uuid;

use super::PaginationError;

/// Position of an entity in a connection ordered by name, then by UUID.
///
/// Encoded as URL safe base64 of `<uuid>:<name>`. Both sort keys are part of the cursor, so a page
/// can be continued with a range query instead of counting the entities in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPosition {
    pub name: String,
    pub id: Uuid,
}

impl CursorPosition {
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.id, self.name))
    }

    /// Decodes a client supplied cursor.
    ///
    /// Fails with `PaginationError::UnsupportedCursor` carrying the cursor as sent.
    pub fn decode(cursor: &str) -> Result<Self, PaginationError> {
        let unsupported = || PaginationError::UnsupportedCursor(cursor.to_string());
        let bytes = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| unsupported())?;
        let text = String::from_utf8(bytes).map_err(|_| unsupported())?;
        let (id, name) = text.split_once(':').ok_or_else(unsupported)?;
        let id = Uuid::parse_str(id).map_err(|_| unsupported())?;
        Ok(Self {
            name: name.to_string(),
            id,
        })
    }
}

/// Entity that can be placed in a connection.
pub trait ConnectionNode {
    fn cursor_position(&self) -> CursorPosition;
}
