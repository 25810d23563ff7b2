use scraper::{ElementRef, Html, Selector};

/// Parsed HTML tree. Extraction code goes through [`Node`] for all queries,
/// so the underlying HTML library never leaks into the heuristics.
pub struct Fragment {
    html: Html,
}

impl Fragment {
    /// Parse a full HTML document (listing and detail pages).
    pub fn parse_document(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// Parse an HTML fragment (feed item descriptions).
    pub fn parse_fragment(raw: &str) -> Self {
        Self {
            html: Html::parse_fragment(raw),
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            element: self.html.root_element(),
        }
    }
}

/// A single element in a parsed tree, offering find-first, find-all,
/// attribute and text access.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    pub fn find_first(&self, selector: &str) -> Option<Node<'a>> {
        let selector = Selector::parse(selector).unwrap();
        self.element
            .select(&selector)
            .next()
            .map(|element| Node { element })
    }

    pub fn find_all(&self, selector: &str) -> Vec<Node<'a>> {
        let selector = Selector::parse(selector).unwrap();
        self.element
            .select(&selector)
            .map(|element| Node { element })
            .collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Concatenated text of this element and its descendants.
    pub fn text(&self) -> String {
        self.element.text().collect::<String>()
    }
}
