//! Name lookup in WGSL source.
//!
//! The renderer does not hard-code where the shader expects its inputs. Before the
//! pipeline is built, the `VertexInput` struct is scanned for the `position` and
//! `texcoord` attribute locations, and the module scope for the `mvp` uniform's
//! group and binding. A name that cannot be found is reported once and the renderer
//! leaves that input unbound instead of failing.

use log::warn;

/// Struct the vertex entry point takes its per-vertex inputs from.
pub const VERTEX_INPUT_STRUCT: &str = "VertexInput";
/// Vertex attribute carrying block positions.
pub const POSITION_ATTRIBUTE: &str = "position";
/// Vertex attribute carrying atlas coordinates.
pub const TEXCOORD_ATTRIBUTE: &str = "texcoord";
/// Uniform holding the view-projection matrix.
pub const MATRIX_UNIFORM: &str = "mvp";

/// Where a module-scope resource is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBinding {
    /// `@group` index
    pub group: u32,
    /// `@binding` index within the group
    pub binding: u32,
}

/// Resolved shader inputs. `None` means the name was not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderBindings {
    /// `@location` of the position attribute
    pub position: Option<u32>,
    /// `@location` of the texcoord attribute
    pub texcoord: Option<u32>,
    /// Binding of the matrix uniform
    pub matrix: Option<ResourceBinding>,
}

/// Resolves every input the block pipeline needs, warning about the missing ones.
pub fn reflect(source: &str) -> ShaderBindings {
    let source = strip_line_comments(source);

    let bindings = ShaderBindings {
        position: attribute_location(&source, VERTEX_INPUT_STRUCT, POSITION_ATTRIBUTE),
        texcoord: attribute_location(&source, VERTEX_INPUT_STRUCT, TEXCOORD_ATTRIBUTE),
        matrix: uniform_binding(&source, MATRIX_UNIFORM),
    };

    if bindings.position.is_none() {
        warn!("Vertex attribute `{POSITION_ATTRIBUTE}` not found in `{VERTEX_INPUT_STRUCT}`");
    }
    if bindings.texcoord.is_none() {
        warn!("Vertex attribute `{TEXCOORD_ATTRIBUTE}` not found in `{VERTEX_INPUT_STRUCT}`");
    }
    if bindings.matrix.is_none() {
        warn!("Uniform `{MATRIX_UNIFORM}` not found");
    }

    bindings
}

/// `@location` of member `attribute` in `struct struct_name`.
pub fn attribute_location(source: &str, struct_name: &str, attribute: &str) -> Option<u32> {
    struct_body(source, struct_name)?
        .split(',')
        .find_map(|member| {
            let (attributes_and_name, _ty) = member.split_once(':')?;
            let name = attributes_and_name.split_whitespace().last()?;
            if name != attribute {
                return None;
            }
            attribute_argument(attributes_and_name, "location")
        })
}

/// Group and binding of `var<uniform> name`.
pub fn uniform_binding(source: &str, name: &str) -> Option<ResourceBinding> {
    source.split(';').find_map(|statement| {
        let (attributes, declaration) = statement.split_once("var<uniform>")?;
        let declared = declaration.split(':').next()?.trim();
        if declared != name {
            return None;
        }
        Some(ResourceBinding {
            group: attribute_argument(attributes, "group")?,
            binding: attribute_argument(attributes, "binding")?,
        })
    })
}

fn strip_line_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split_once("//").map_or(line, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

fn struct_body<'a>(source: &'a str, struct_name: &str) -> Option<&'a str> {
    let mut rest = source;
    while let Some(start) = rest.find("struct") {
        let after_keyword = &rest[start + "struct".len()..];
        let open = after_keyword.find('{')?;
        if after_keyword[..open].trim() == struct_name {
            let body = &after_keyword[open + 1..];
            let close = body.find('}')?;
            return Some(&body[..close]);
        }
        rest = after_keyword;
    }
    None
}

/// The integer argument of `@name(..)` within `text`.
fn attribute_argument(text: &str, name: &str) -> Option<u32> {
    let marker = format!("@{name}(");
    let start = text.find(&marker)? + marker.len();
    let end = text[start..].find(')')? + start;
    text[start..end].trim().parse().ok()
}
