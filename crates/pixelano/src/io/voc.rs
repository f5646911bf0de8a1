use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use crate::{
    error::{PixelanoError, Result},
    types::{Annotation, Instance},
};

impl Annotation {
    /// Serialize to a Pascal VOC style XML document
    pub fn to_voc_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        start(&mut writer, "annotation")?;
        writer.create_element("folder").write_empty()?;
        text_element(&mut writer, "filename", &self.filename)?;
        text_element(&mut writer, "path", &self.path)?;
        writer.create_element("source").write_empty()?;

        start(&mut writer, "size")?;
        text_element(&mut writer, "width", &self.width.to_string())?;
        text_element(&mut writer, "height", &self.height.to_string())?;
        text_element(&mut writer, "depth", &self.depth.to_string())?;
        end(&mut writer, "size")?;
        text_element(&mut writer, "segmented", "0")?;

        for instance in &self.instances {
            write_object(&mut writer, instance)?;
        }

        end(&mut writer, "annotation")?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Save the VOC document to file, replacing any existing file
    pub fn save_voc<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let xml = self.to_voc_string()?;
        std::fs::write(path, xml)?;
        Ok(())
    }
}

fn write_object<W: Write>(writer: &mut Writer<W>, instance: &Instance) -> Result<()> {
    start(writer, "object")?;
    text_element(writer, "name", &instance.class_name)?;
    text_element(writer, "pose", "Unspecified")?;
    text_element(writer, "truncated", "0")?;
    text_element(writer, "difficult", "0")?;
    text_element(writer, "occluded", "0")?;

    let (xmin, ymin, xmax, ymax) = instance.bounding_box.truncated();
    start(writer, "bndbox")?;
    text_element(writer, "xmin", &xmin.to_string())?;
    text_element(writer, "xmax", &xmax.to_string())?;
    text_element(writer, "ymin", &ymin.to_string())?;
    text_element(writer, "ymax", &ymax.to_string())?;
    end(writer, "bndbox")?;

    // 1-indexed, closing vertex included
    start(writer, "polygon")?;
    for (i, [x, y]) in instance.polygon.iter().enumerate() {
        text_element(writer, &format!("x{}", i + 1), &format_coordinate(*x))?;
        text_element(writer, &format!("y{}", i + 1), &format_coordinate(*y))?;
    }
    end(writer, "polygon")?;

    end(writer, "object")
}

/// Whole pixel coordinates keep one decimal, e.g. `3.0`.
fn format_coordinate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    writer.create_element(name).write_text_content(BytesText::new(value))?;
    Ok(())
}

/// An annotation file read back from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocAnnotation {
    pub filename: String,
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub depth: u8,
    pub objects: Vec<VocObject>,
}

/// One `<object>` block with its integer box and polygon vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocObject {
    pub name: String,
    pub xmin: i64,
    pub xmax: i64,
    pub ymin: i64,
    pub ymax: i64,
    pub polygon: Vec<[f64; 2]>,
}

#[derive(Default)]
struct PendingObject {
    name: String,
    bndbox: [Option<i64>; 4],
    vertices: BTreeMap<usize, [Option<f64>; 2]>,
}

impl PendingObject {
    fn finish(self) -> Result<VocObject> {
        let [Some(xmin), Some(xmax), Some(ymin), Some(ymax)] = self.bndbox else {
            return Err(PixelanoError::AnnotationParse(format!(
                "object '{}' has an incomplete <bndbox>",
                self.name
            )));
        };

        let polygon = self
            .vertices
            .into_iter()
            .map(|(index, vertex)| match vertex {
                [Some(x), Some(y)] => Ok([x, y]),
                _ => Err(PixelanoError::AnnotationParse(format!(
                    "polygon vertex {} of object '{}' is missing a coordinate",
                    index, self.name
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(VocObject { name: self.name, xmin, xmax, ymin, ymax, polygon })
    }
}

impl VocAnnotation {
    pub fn from_voc_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_voc_str(&xml)
    }

    pub fn from_voc_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut annotation = VocAnnotation::default();
        let mut stack: Vec<String> = Vec::new();
        let mut object: Option<PendingObject> = None;
        let mut saw_root = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if stack.is_empty() {
                        if name != "annotation" {
                            return Err(PixelanoError::AnnotationParse(format!(
                                "unexpected root element <{}>",
                                name
                            )));
                        }
                        saw_root = true;
                    }
                    if stack.len() == 1 && name == "object" {
                        object = Some(PendingObject::default());
                    }
                    stack.push(name);
                }
                Event::End(_) => {
                    if stack.len() == 2 && stack[1] == "object" {
                        if let Some(pending) = object.take() {
                            annotation.objects.push(pending.finish()?);
                        }
                    }
                    stack.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    annotation.assign(&stack, text.trim(), object.as_mut())?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(PixelanoError::AnnotationParse("missing <annotation> root".to_string()));
        }

        Ok(annotation)
    }

    fn assign(&mut self, stack: &[String], text: &str, object: Option<&mut PendingObject>) -> Result<()> {
        let path: Vec<&str> = stack.iter().map(String::as_str).collect();

        match (path.as_slice(), object) {
            (["annotation", "filename"], _) => self.filename = text.to_string(),
            (["annotation", "path"], _) => self.path = text.to_string(),
            (["annotation", "size", "width"], _) => self.width = parse_number(text, "width")?,
            (["annotation", "size", "height"], _) => self.height = parse_number(text, "height")?,
            (["annotation", "size", "depth"], _) => self.depth = parse_number(text, "depth")?,
            (["annotation", "object", "name"], Some(object)) => object.name = text.to_string(),
            (["annotation", "object", "bndbox", field], Some(object)) => {
                let slot = match *field {
                    "xmin" => 0,
                    "xmax" => 1,
                    "ymin" => 2,
                    "ymax" => 3,
                    _ => return Ok(()),
                };
                object.bndbox[slot] = Some(parse_number(text, field)?);
            }
            (["annotation", "object", "polygon", tag], Some(object)) => {
                let (axis, index) = if let Some(index) = tag.strip_prefix('x') {
                    (0, index)
                } else if let Some(index) = tag.strip_prefix('y') {
                    (1, index)
                } else {
                    return Ok(());
                };
                let index: usize = parse_number(index, tag)?;
                object.vertices.entry(index).or_default()[axis] = Some(parse_number(text, tag)?);
            }
            _ => {}
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, tag: &str) -> Result<T> {
    text.parse().map_err(|_| {
        PixelanoError::AnnotationParse(format!("invalid number '{}' in <{}>", text, tag))
    })
}
