//! presentation.xml 文档树 - 包处理层
//!
//! 将 XML 读成一棵带命名空间信息的节点树，提供按谓词删除元素和
//! 格式化输出两种能力。

use crate::error::{PackageError, PackageResult};
use quick_xml::events::{BytesCData, BytesDecl, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;

/// PresentationML 主命名空间
pub const PRESENTATIONML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// 只读保护标记的本地名
pub const MODIFY_VERIFIER: &str = "modifyVerifier";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const INDENT: usize = 2;

/// 文档树节点
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    Text(BytesText<'static>),
    CData(BytesCData<'static>),
    Comment(BytesText<'static>),
    PI(BytesPI<'static>),
    DocType(BytesText<'static>),
}

/// 元素节点
///
/// 保留原始的开始标签（含属性和命名空间声明），写回时字节不变。
#[derive(Debug, Clone)]
pub struct XmlElement {
    start: BytesStart<'static>,
    namespace: Option<Vec<u8>>,
    children: Vec<XmlNode>,
    /// 处于 `xml:space="preserve"` 作用域内
    preserve_space: bool,
}

impl XmlElement {
    /// 不含前缀的元素名
    pub fn local_name(&self) -> &[u8] {
        self.start.local_name().into_inner()
    }

    /// 解析后的命名空间 URI，未绑定时为 None
    pub fn namespace(&self) -> Option<&[u8]> {
        self.namespace.as_deref()
    }

    /// 是否为指定命名空间下的指定元素
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == Some(namespace.as_bytes()) && self.local_name() == local_name.as_bytes()
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }
}

/// 判断元素是否为只读保护标记 `p:modifyVerifier`
pub fn is_modify_verifier(element: &XmlElement) -> bool {
    element.is(PRESENTATIONML_NS, MODIFY_VERIFIER)
}

/// 解析后的 XML 文档
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// XML 声明中的 standalone 值
    standalone: Option<String>,
    /// 顶层节点（根元素及其前后的注释、处理指令）
    nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// 解析 XML 字节
    ///
    /// 元素子节点之间的格式化空白会被丢弃；元素唯一的空白内容、混合内容
    /// 以及 `xml:space="preserve"` 作用域内的空白原样保留。
    pub fn parse(source: &[u8]) -> PackageResult<Self> {
        let source = source.strip_prefix(UTF8_BOM).unwrap_or(source);
        let mut reader = NsReader::from_reader(source);

        let mut standalone = None;
        let mut nodes = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let (namespace, event) = match reader.read_resolved_event() {
                Ok((resolved, event)) => (resolve_namespace(resolved)?, event),
                Err(e) => return Err(PackageError::malformed(e)),
            };

            match event {
                Event::Decl(decl) => {
                    standalone = decl
                        .standalone()
                        .transpose()
                        .map_err(PackageError::malformed)?
                        .map(|value| String::from_utf8_lossy(&value).into_owned());
                }
                Event::Start(start) => {
                    let inherited = stack.last().map_or(false, |parent| parent.preserve_space);
                    let preserve_space = scan_attributes(&start, inherited)?;
                    stack.push(XmlElement {
                        start: start.into_owned(),
                        namespace,
                        children: Vec::new(),
                        preserve_space,
                    });
                }
                Event::Empty(start) => {
                    let inherited = stack.last().map_or(false, |parent| parent.preserve_space);
                    let preserve_space = scan_attributes(&start, inherited)?;
                    let element = XmlElement {
                        start: start.into_owned(),
                        namespace,
                        children: Vec::new(),
                        preserve_space,
                    };
                    attach(&mut stack, &mut nodes, XmlNode::Element(element));
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| PackageError::malformed("出现多余的结束标签"))?;
                    if !element.preserve_space {
                        drop_formatting_whitespace(&mut element.children);
                    }
                    attach(&mut stack, &mut nodes, XmlNode::Element(element));
                }
                Event::Text(text) => {
                    if stack.is_empty() {
                        if is_blank(&text) {
                            continue;
                        }
                        return Err(PackageError::malformed("根元素之外出现文本内容"));
                    }
                    attach(&mut stack, &mut nodes, XmlNode::Text(text.into_owned()));
                }
                Event::CData(data) => {
                    if stack.is_empty() {
                        return Err(PackageError::malformed("根元素之外出现 CDATA"));
                    }
                    attach(&mut stack, &mut nodes, XmlNode::CData(data.into_owned()));
                }
                Event::Comment(comment) => {
                    attach(&mut stack, &mut nodes, XmlNode::Comment(comment.into_owned()));
                }
                Event::PI(pi) => {
                    attach(&mut stack, &mut nodes, XmlNode::PI(pi.into_owned()));
                }
                Event::DocType(doctype) => {
                    nodes.push(XmlNode::DocType(doctype.into_owned()));
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(PackageError::malformed(format!(
                "元素 <{}> 未闭合",
                String::from_utf8_lossy(open.start.name().as_ref())
            )));
        }

        let roots = nodes
            .iter()
            .filter(|node| matches!(node, XmlNode::Element(_)))
            .count();
        if roots != 1 {
            return Err(PackageError::malformed(format!(
                "文档应当有且仅有一个根元素，实际为 {} 个",
                roots
            )));
        }

        Ok(Self { standalone, nodes })
    }

    /// 根元素
    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// 删除根元素下所有满足谓词的元素（任意深度），返回删除数量
    ///
    /// 被删除元素的子树一并移除，其余兄弟节点顺序不变。根元素本身不参与过滤。
    pub fn remove_elements<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&XmlElement) -> bool,
    {
        self.nodes
            .iter_mut()
            .map(|node| match node {
                XmlNode::Element(root) => retain_children(&mut root.children, &predicate),
                _ => 0,
            })
            .sum()
    }

    /// 统计满足谓词的元素数量（含根元素）
    pub fn count_elements<P>(&self, predicate: P) -> usize
    where
        P: Fn(&XmlElement) -> bool,
    {
        count_in(&self.nodes, &predicate)
    }

    /// 带 XML 声明、UTF-8、两空格缩进的输出
    ///
    /// 含文本的元素（混合内容）内部不插入缩进。
    pub fn to_pretty_bytes(&self) -> PackageResult<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new(
                "1.0",
                Some("UTF-8"),
                self.standalone.as_deref(),
            )))
            .map_err(PackageError::io)?;

        for node in &self.nodes {
            write_node(&mut writer, node, Some(0))?;
        }

        let mut output = writer.into_inner();
        output.push(b'\n');
        Ok(output)
    }
}

fn resolve_namespace(resolved: ResolveResult<'_>) -> PackageResult<Option<Vec<u8>>> {
    match resolved {
        ResolveResult::Bound(namespace) => Ok(Some(namespace.as_ref().to_vec())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(PackageError::malformed(format!(
            "未声明的命名空间前缀: {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// 校验全部属性，返回该元素的 `xml:space="preserve"` 状态
fn scan_attributes(start: &BytesStart<'_>, inherited: bool) -> PackageResult<bool> {
    let mut preserve_space = inherited;
    for attr in start.attributes() {
        let attr = attr.map_err(PackageError::malformed)?;
        if attr.key.as_ref() == b"xml:space" {
            match &*attr.value {
                b"preserve" => preserve_space = true,
                b"default" => preserve_space = false,
                _ => {}
            }
        }
    }
    Ok(preserve_space)
}

/// 只由 XML 空白字符组成（空格、制表、回车、换行）
fn is_blank(text: &[u8]) -> bool {
    text.iter()
        .all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

/// 子节点里有元素且没有实际文本时，空白文本只是格式化缩进
fn drop_formatting_whitespace(children: &mut Vec<XmlNode>) {
    let has_elements = children
        .iter()
        .any(|node| matches!(node, XmlNode::Element(_)));
    let has_content = children.iter().any(|node| match node {
        XmlNode::Text(text) => !is_blank(text),
        XmlNode::CData(_) => true,
        _ => false,
    });

    if has_elements && !has_content {
        children.retain(|node| !matches!(node, XmlNode::Text(_)));
    }
}

fn is_mixed(element: &XmlElement) -> bool {
    element
        .children
        .iter()
        .any(|node| matches!(node, XmlNode::Text(_) | XmlNode::CData(_)))
}

fn line_break(writer: &mut Writer<Vec<u8>>, depth: usize) {
    let output = writer.get_mut();
    output.push(b'\n');
    output.extend(std::iter::repeat(b' ').take(depth * INDENT));
}

fn attach(stack: &mut [XmlElement], nodes: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

fn retain_children<P>(children: &mut Vec<XmlNode>, predicate: &P) -> usize
where
    P: Fn(&XmlElement) -> bool,
{
    let before = children.len();
    children.retain(|node| !matches!(node, XmlNode::Element(element) if predicate(element)));
    let mut removed = before - children.len();

    for node in children.iter_mut() {
        if let XmlNode::Element(element) = node {
            removed += retain_children(&mut element.children, predicate);
        }
    }
    removed
}

fn count_in<P>(nodes: &[XmlNode], predicate: &P) -> usize
where
    P: Fn(&XmlElement) -> bool,
{
    nodes
        .iter()
        .map(|node| match node {
            XmlNode::Element(element) => {
                usize::from(predicate(element)) + count_in(&element.children, predicate)
            }
            _ => 0,
        })
        .sum()
}

/// `depth` 为 None 表示位于混合内容中，原样输出不缩进
fn write_node(
    writer: &mut Writer<Vec<u8>>,
    node: &XmlNode,
    depth: Option<usize>,
) -> PackageResult<()> {
    if let Some(depth) = depth {
        line_break(writer, depth);
    }

    match node {
        XmlNode::Element(element) => {
            if element.children.is_empty() {
                writer
                    .write_event(Event::Empty(element.start.clone()))
                    .map_err(PackageError::io)?;
            } else {
                writer
                    .write_event(Event::Start(element.start.clone()))
                    .map_err(PackageError::io)?;

                let child_depth = match depth {
                    Some(depth) if !is_mixed(element) => Some(depth + 1),
                    _ => None,
                };
                for child in &element.children {
                    write_node(writer, child, child_depth)?;
                }
                if let (Some(depth), Some(_)) = (depth, child_depth) {
                    line_break(writer, depth);
                }

                writer
                    .write_event(Event::End(element.start.to_end()))
                    .map_err(PackageError::io)?;
            }
        }
        XmlNode::Text(text) => writer
            .write_event(Event::Text(text.clone()))
            .map_err(PackageError::io)?,
        XmlNode::CData(data) => writer
            .write_event(Event::CData(data.clone()))
            .map_err(PackageError::io)?,
        XmlNode::Comment(comment) => writer
            .write_event(Event::Comment(comment.clone()))
            .map_err(PackageError::io)?,
        XmlNode::PI(pi) => writer
            .write_event(Event::PI(pi.clone()))
            .map_err(PackageError::io)?,
        XmlNode::DocType(doctype) => writer
            .write_event(Event::DocType(doctype.clone()))
            .map_err(PackageError::io)?,
    }
    Ok(())
}
