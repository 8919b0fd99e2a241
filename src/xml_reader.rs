//! Generic XML-to-tree reader.
//!
//! Turns raw XML text into a [`DocumentTree`]: elements become object keys,
//! attributes are merged into their element's object and repeated sibling
//! elements collapse into an array. The reader knows nothing about credit
//! reports.

use crate::errors::ReportError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

/// Generic nested key/value tree built from an XML document.
///
/// Scalars are strings or numbers, elements are objects and repeated
/// siblings are arrays. An element node is never itself an array.
pub type DocumentTree = Value;

/// Key holding the text of an element that also has children or attributes.
pub const TEXT_KEY: &str = "#text";

/// Reader behaviour switches. Passed explicitly to every reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Drop attributes instead of merging them into the element object.
    pub ignore_attributes: bool,
    /// Prefix prepended to attribute names when merged.
    pub attribute_prefix: String,
    /// Turn numeric-looking text into numbers when the conversion is lossless.
    pub parse_values: bool,
    /// Trim surrounding whitespace from text and attribute values.
    pub trim_values: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            ignore_attributes: false,
            attribute_prefix: String::new(),
            parse_values: true,
            trim_values: true,
        }
    }
}

/// Element being assembled while its closing tag is still pending.
struct OpenElement {
    name: String,
    children: Map<String, Value>,
    text: String,
}

/// XML reader bound to a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct XmlReader {
    options: ReaderOptions,
}

impl XmlReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Parse `text` into a [`DocumentTree`].
    ///
    /// The returned tree is an object holding the root element under its own
    /// name, e.g. `{"INProfileResponse": {...}}`.
    ///
    /// # Errors
    ///
    /// * [`ReportError::NotXml`] when the text does not start with `<`
    ///   (after an optional byte-order mark and whitespace).
    /// * [`ReportError::MalformedDocument`] when parsing fails.
    pub fn read(&self, text: &str) -> Result<DocumentTree, ReportError> {
        let body = text.trim_start_matches('\u{feff}').trim_start();
        if !body.starts_with('<') {
            return Err(ReportError::NotXml);
        }

        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(self.options.trim_values);

        let mut document = Map::new();
        let mut stack: Vec<OpenElement> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| malformed(&reader, e.to_string()))?;

            match event {
                Event::Start(start) => {
                    let element = self.open_element(&reader, &start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = self.open_element(&reader, &start)?;
                    let (name, node) = self.close_element(element);
                    attach(parent_map(&mut stack, &mut document), name, node);
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        malformed(&reader, "closing tag without an open element".to_string())
                    })?;
                    let (name, node) = self.close_element(element);
                    attach(parent_map(&mut stack, &mut document), name, node);
                }
                Event::Text(content) => {
                    if let Some(open) = stack.last_mut() {
                        let unescaped = content
                            .unescape()
                            .map_err(|e| malformed(&reader, e.to_string()))?;
                        open.text.push_str(&unescaped);
                    }
                }
                Event::CData(content) => {
                    if let Some(open) = stack.last_mut() {
                        let raw = content.into_inner();
                        let decoded = std::str::from_utf8(&raw)
                            .map_err(|e| malformed(&reader, e.to_string()))?;
                        open.text.push_str(decoded);
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes carry no data.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(
                &reader,
                format!("unexpected end of document: unclosed element <{}>", open.name),
            ));
        }
        if document.is_empty() {
            return Err(malformed(&reader, "document has no root element".to_string()));
        }

        Ok(Value::Object(document))
    }

    fn open_element(
        &self,
        reader: &Reader<&[u8]>,
        start: &BytesStart<'_>,
    ) -> Result<OpenElement, ReportError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| malformed(reader, e.to_string()))?
            .to_string();

        let mut children = Map::new();
        if !self.options.ignore_attributes {
            for attribute in start.attributes() {
                let attribute = attribute.map_err(|e| malformed(reader, e.to_string()))?;
                let key = std::str::from_utf8(attribute.key.as_ref())
                    .map_err(|e| malformed(reader, e.to_string()))?;
                let value = attribute
                    .unescape_value()
                    .map_err(|e| malformed(reader, e.to_string()))?;
                let node = self.scalar(&value);
                attach(
                    &mut children,
                    format!("{}{}", self.options.attribute_prefix, key),
                    node,
                );
            }
        }

        Ok(OpenElement {
            name,
            children,
            text: String::new(),
        })
    }

    /// Finish an element: bare text becomes a scalar, otherwise text joins
    /// the object under the text key.
    fn close_element(&self, element: OpenElement) -> (String, Value) {
        let OpenElement {
            name,
            mut children,
            text,
        } = element;

        if children.is_empty() {
            return (name, self.scalar(&text));
        }

        let text = if self.options.trim_values {
            text.trim()
        } else {
            text.as_str()
        };
        if !text.is_empty() {
            let node = self.scalar(text);
            children.insert(TEXT_KEY.to_string(), node);
        }
        (name, Value::Object(children))
    }

    fn scalar(&self, raw: &str) -> Value {
        let text = if self.options.trim_values {
            raw.trim()
        } else {
            raw
        };
        if self.options.parse_values {
            if let Some(number) = lossless_number(text) {
                return Value::Number(number);
            }
        }
        Value::String(text.to_string())
    }
}

/// Parse `text` with default [`ReaderOptions`].
pub fn read_document(text: &str) -> Result<DocumentTree, ReportError> {
    XmlReader::default().read(text)
}

/// Convert text to a number only when the number renders back to the exact
/// same text, so identifiers like `"0012"` or `"1234.50"` stay strings.
fn lossless_number(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        let number = Number::from(int);
        return (number.to_string() == text).then_some(number);
    }
    let float = text.parse::<f64>().ok()?;
    let number = Number::from_f64(float)?;
    (number.to_string() == text).then_some(number)
}

/// Insert a child node, turning a second occurrence of the same name into an array.
fn attach(parent: &mut Map<String, Value>, name: String, node: Value) {
    match parent.get_mut(&name) {
        None => {
            parent.insert(name, node);
        }
        Some(Value::Array(items)) => items.push(node),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, node]);
        }
    }
}

fn parent_map<'a>(
    stack: &'a mut [OpenElement],
    document: &'a mut Map<String, Value>,
) -> &'a mut Map<String, Value> {
    match stack.last_mut() {
        Some(open) => &mut open.children,
        None => document,
    }
}

fn malformed(reader: &Reader<&[u8]>, message: String) -> ReportError {
    ReportError::MalformedDocument {
        position: reader.buffer_position() as u64,
        message,
    }
}
