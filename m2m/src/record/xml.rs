//! UNTL XML serialization of a [`MetadataTree`].

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::tree::{AgentElement, BasicElement, MetadataTree, Node};
use crate::error::{ConvertError, ConvertResult};

/// Root element of every record.
pub const ROOT_ELEMENT: &str = "metadata";

const INDENT_SIZE: usize = 2;

/// Serialize a tree to pretty-printed XML with a UTF-8 declaration.
///
/// Nodes are written in insertion order. Output ends with a newline.
pub fn to_xml_string(tree: &MetadataTree) -> ConvertResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write_event(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;

    for node in tree {
        match node {
            Node::Basic(basic) => write_basic(&mut writer, basic)?,
            Node::Agent(agent) => write_agent(&mut writer, agent)?,
        }
    }

    write_event(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| ConvertError::Xml(format!("Invalid UTF-8 in generated XML: {}", e)))?;
    xml.push('\n');
    Ok(xml)
}

fn write_basic(writer: &mut Writer<Vec<u8>>, basic: &BasicElement) -> ConvertResult<()> {
    let mut start = BytesStart::new(basic.element.name());
    if let Some(ref q) = basic.qualifier {
        start.push_attribute(("qualifier", q.as_str()));
    }
    write_text_element(writer, start, &basic.content)
}

fn write_agent(writer: &mut Writer<Vec<u8>>, agent: &AgentElement) -> ConvertResult<()> {
    let tag = agent.element.name();
    let mut start = BytesStart::new(tag);
    if let Some(ref q) = agent.qualifier {
        start.push_attribute(("qualifier", q.as_str()));
    }
    write_event(writer, Event::Start(start))?;

    for (child, value) in agent.children() {
        write_text_element(writer, BytesStart::new(child.name()), value)?;
    }

    write_event(writer, Event::End(BytesEnd::new(tag)))
}

/// `<tag>text</tag>` on one line, or `<tag/>` when the text is empty.
fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    text: &str,
) -> ConvertResult<()> {
    if text.is_empty() {
        return write_event(writer, Event::Empty(start));
    }
    let end = start.to_end().into_owned();
    write_event(writer, Event::Start(start))?;
    write_event(writer, Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    write_event(writer, Event::End(end))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ConvertResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ConvertError::Xml(format!("Failed to write XML event: {}", e)))
}
