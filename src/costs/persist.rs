//! 代价函数的二进制存储
//!
//! 每个代价函数记录依次为：
//!
//! 1. 类型名（带长度前缀的字符串），用于在工厂中查找构造函数；
//! 2. 记录格式版本号 [`FORMAT_VERSION`]，描述这一层封装本身；
//! 3. 代价函数自己的版本号；
//! 4. 按该版本约定的顺序排列的参数。
//!
//! 这段记录通常嵌在更大的模型文件中，因此读写之后流的位置恰好在记录末尾。
//! 出错时流的位置不确定，已经写出的部分也不会回滚。

use super::{registry, BasisCost};
use crate::error::{Error, Result};
use crate::io::{BinaryReader, BinaryWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

pub const FORMAT_VERSION: u16 = 1;

pub fn write_basis_cost<W: Write>(writer: &mut BinaryWriter<W>, cost: &dyn BasisCost) -> Result<()> {
    writer.write_str(cost.type_name())?;
    writer.write_u16(FORMAT_VERSION)?;
    writer.write_u16(cost.version_no())?;
    cost.write_parameters(&mut writer.as_dyn())
}

/// 记录开头的类型名和两个版本号，按流中实际读到的值保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub type_name: String,
    pub format_version: u16,
    pub version: u16,
}

/// 读出一条记录，同时返回记录头，供需要知道文件实际版本的调用方使用
pub fn read_record<R: Read>(
    reader: &mut BinaryReader<R>,
) -> Result<(RecordHeader, Box<dyn BasisCost>)> {
    let type_name = reader.read_string()?;
    let mut cost = registry::create(&type_name)?;
    let format_version = reader.read_u16()?;
    if format_version == 0 || format_version > FORMAT_VERSION {
        return Err(Error::UnsupportedVersion {
            type_name: format!("{type_name} 记录格式"),
            found: format_version,
            supported: FORMAT_VERSION,
        });
    }
    let version = reader.read_u16()?;
    if version == 0 || version > cost.version_no() {
        return Err(Error::UnsupportedVersion {
            type_name,
            found: version,
            supported: cost.version_no(),
        });
    }
    cost.read_parameters(version, &mut reader.as_dyn())?;
    debug!("读入代价函数 {}（版本 {}）", cost, version);
    let header = RecordHeader {
        type_name,
        format_version,
        version,
    };
    Ok((header, cost))
}

pub fn read_basis_cost<R: Read>(reader: &mut BinaryReader<R>) -> Result<Box<dyn BasisCost>> {
    read_record(reader).map(|(_, cost)| cost)
}

pub fn to_bytes(cost: &dyn BasisCost) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new(Vec::new());
    write_basis_cost(&mut writer, cost)?;
    Ok(writer.into_inner())
}

/// 从字节串中读出一个代价函数，字节串必须恰好是一条完整的记录
pub fn from_bytes(bytes: &[u8]) -> Result<Box<dyn BasisCost>> {
    let mut reader = BinaryReader::new(bytes);
    let cost = read_basis_cost(&mut reader)?;
    let rest = reader.into_inner();
    if !rest.is_empty() {
        return Err(Error::Corrupt(format!("记录之后还有 {} 个多余字节", rest.len())));
    }
    Ok(cost)
}

/// 把代价函数单独保存为一个带流头的文件
pub fn save(path: &Path, cost: &dyn BasisCost) -> Result<()> {
    let mut writer = BinaryWriter::new(BufWriter::new(File::create(path)?));
    writer.write_header()?;
    write_basis_cost(&mut writer, cost)?;
    writer.flush()
}

pub fn load(path: &Path) -> Result<Box<dyn BasisCost>> {
    load_record(path).map(|(_, cost)| cost)
}

pub fn load_record(path: &Path) -> Result<(RecordHeader, Box<dyn BasisCost>)> {
    let mut reader = BinaryReader::new(BufReader::new(File::open(path)?));
    reader.read_header()?;
    read_record(&mut reader)
}
