use super::{MAX_CONNECTION_SIZE, PaginationError};

/// Raw relay pagination arguments of a connection field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageArguments {
    pub first: Option<i32>,
    pub after: Option<String>,
    pub last: Option<i32>,
    pub before: Option<String>,
}

/// Direction in which a page is read from the ordered relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    /// Reads `limit` entries following `cursor`, or from the start.
    Forward,
    /// Reads `limit` entries preceding `cursor`, or up to the end.
    Backward,
}

/// Validated slice of an ordered relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub direction: PageDirection,
    /// Opaque cursor the page starts after (forward) or ends before (backward).
    pub cursor: Option<String>,
    /// Maximum number of entries in the page.
    pub limit: usize,
}

impl PageWindow {
    /// Validates pagination arguments.
    ///
    /// * `arguments` - Relay arguments as sent by the client.
    /// * `default_size` - Page size if neither `first` nor `last` is given.
    ///
    /// Sizes above `MAX_CONNECTION_SIZE` are clamped.
    pub fn from_arguments(
        arguments: PageArguments,
        default_size: usize,
    ) -> Result<Self, PaginationError> {
        let PageArguments {
            first,
            after,
            last,
            before,
        } = arguments;
        if first.is_some() && last.is_some() {
            return Err(PaginationError::FirstAndLast);
        }
        let first = first.map(|size| checked_size(size, "first")).transpose()?;
        let last = last.map(|size| checked_size(size, "last")).transpose()?;
        let backward = last.is_some() || before.is_some();
        if backward && (first.is_some() || after.is_some()) {
            return Err(PaginationError::MixedDirection);
        }
        let window = if backward {
            Self {
                direction: PageDirection::Backward,
                cursor: before,
                limit: last.unwrap_or(default_size),
            }
        } else {
            Self {
                direction: PageDirection::Forward,
                cursor: after,
                limit: first.unwrap_or(default_size),
            }
        };
        Ok(window.clamped())
    }

    fn clamped(mut self) -> Self {
        self.limit = self.limit.min(MAX_CONNECTION_SIZE);
        self
    }
}

fn checked_size(size: i32, argument: &'static str) -> Result<usize, PaginationError> {
    usize::try_from(size).map_err(|_| PaginationError::NegativeSize(argument))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_forward_window_from_start() {
        let window = PageWindow::from_arguments(PageArguments::default(), 10).unwrap();
        assert_eq!(
            window,
            PageWindow {
                direction: PageDirection::Forward,
                cursor: None,
                limit: 10,
            }
        );
    }

    #[test]
    fn last_with_before_reads_backward() {
        let arguments = PageArguments {
            last: Some(2),
            before: Some("cursor".to_string()),
            ..Default::default()
        };
        let window = PageWindow::from_arguments(arguments, 10).unwrap();
        assert_eq!(window.direction, PageDirection::Backward);
        assert_eq!(window.cursor.as_deref(), Some("cursor"));
        assert_eq!(window.limit, 2);
    }

    #[test]
    fn clamps_oversized_pages() {
        let arguments = PageArguments {
            first: Some(i32::MAX),
            ..Default::default()
        };
        let window = PageWindow::from_arguments(arguments, 10).unwrap();
        assert_eq!(window.limit, MAX_CONNECTION_SIZE);
    }

    #[test]
    fn rejects_invalid_argument_combinations() {
        let first_and_last = PageArguments {
            first: Some(1),
            last: Some(1),
            ..Default::default()
        };
        assert_eq!(
            PageWindow::from_arguments(first_and_last, 10),
            Err(PaginationError::FirstAndLast)
        );

        let negative = PageArguments {
            last: Some(-1),
            ..Default::default()
        };
        assert_eq!(
            PageWindow::from_arguments(negative, 10),
            Err(PaginationError::NegativeSize("last"))
        );

        let mixed = PageArguments {
            first: Some(3),
            before: Some("cursor".to_string()),
            ..Default::default()
        };
        assert_eq!(
            PageWindow::from_arguments(mixed, 10),
            Err(PaginationError::MixedDirection)
        );
    }
}
