// Picks the section the reader is currently in, for nav link highlighting.

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBox {
    pub id: Option<String>,
    pub top: f64,
    pub height: f64,
}

/// Scan in source order; a section is current when
/// `scroll_y` is in `[top - header - lead, top - header - lead + height)`.
/// Later matches override earlier ones. A winning section without an id
/// yields `None`.
pub fn current_section(
    sections: &[SectionBox],
    scroll_y: f64,
    header_height: f64,
    lead: f64,
) -> Option<&str> {
    let mut current: Option<&SectionBox> = None;
    for s in sections {
        let start = s.top - header_height - lead;
        if scroll_y >= start && scroll_y < start + s.height {
            current = Some(s);
        }
    }
    current.and_then(|s| s.id.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sec(id: &str, top: f64, height: f64) -> SectionBox {
        SectionBox {
            id: Some(id.to_string()),
            top,
            height,
        }
    }

    #[test]
    fn boundaries_account_for_header_and_lead() {
        let s = [sec("a", 500.0, 400.0)];
        // start = 500 - 80 - 100 = 320
        assert_eq!(current_section(&s, 319.0, 80.0, 100.0), None);
        assert_eq!(current_section(&s, 320.0, 80.0, 100.0), Some("a"));
        assert_eq!(current_section(&s, 719.0, 80.0, 100.0), Some("a"));
        assert_eq!(current_section(&s, 720.0, 80.0, 100.0), None);
    }

    #[test]
    fn last_overlapping_section_wins() {
        let s = [sec("a", 0.0, 1000.0), sec("b", 200.0, 1000.0)];
        assert_eq!(current_section(&s, 150.0, 0.0, 100.0), Some("b"));
    }

    #[test]
    fn anonymous_winner_clears_selection() {
        let s = [
            sec("a", 0.0, 1000.0),
            SectionBox {
                id: None,
                top: 200.0,
                height: 1000.0,
            },
        ];
        assert_eq!(current_section(&s, 150.0, 0.0, 100.0), None);
    }
}
