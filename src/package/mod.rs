//! 包处理层（Package）
//!
//! - `archive` - 解包到私有临时目录、重新打包
//! - `descriptor` - presentation.xml 文档树
//! - `transformer` - 串起上面两步的单文件转换

pub mod archive;
pub mod descriptor;
pub mod transformer;

pub use archive::{MemberKind, PackageMember, UnpackedPackage};
pub use descriptor::{is_modify_verifier, XmlDocument, XmlElement, XmlNode};
pub use transformer::transform;
