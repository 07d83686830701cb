//! 二进制读写
//!
//! 所有数值均按小端序定长存储；字符串和数组先写一个 u64 长度，再写内容。
//! 文件开头可以带一个流头（魔数 `MCAL` 加流版本号），用来识别文件类型。

use crate::error::{Error, Result};
use std::io::{Read, Write};

pub const MAGIC: [u8; 4] = *b"MCAL";
pub const STREAM_VERSION: u16 = 1;

/// 单个字符串或数组允许的最大长度，防止损坏的长度字段导致巨量内存分配
const MAX_LENGTH: u64 = 1 << 32;

pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// 借出一个类型擦除的写入器，供代价函数写出自己的参数
    pub fn as_dyn(&mut self) -> BinaryWriter<&mut dyn Write> {
        BinaryWriter::new(&mut self.inner)
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.inner.write_all(&MAGIC)?;
        self.write_u16(STREAM_VERSION)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.inner.write_all(&[value as u8])?;
        Ok(())
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_u64(value.len() as u64)?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    pub fn write_f64_slice(&mut self, values: &[f64]) -> Result<()> {
        self.write_u64(values.len() as u64)?;
        for value in values {
            self.write_f64(*value)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn as_dyn(&mut self) -> BinaryReader<&mut dyn Read> {
        BinaryReader::new(&mut self.inner)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buffer = [0u8; N];
        self.inner.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    pub fn read_header(&mut self) -> Result<()> {
        let magic: [u8; 4] = self.read_array()?;
        if magic != MAGIC {
            return Err(Error::Corrupt(format!("魔数 {magic:02x?} 不是 MCAL 文件")));
        }
        let version = self.read_u16()?;
        if version == 0 || version > STREAM_VERSION {
            return Err(Error::UnsupportedVersion {
                type_name: "binary stream".to_string(),
                found: version,
                supported: STREAM_VERSION,
            });
        }
        Ok(())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        let [byte] = self.read_array::<1>()?;
        match byte {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::Corrupt(format!("布尔值的字节为 {other}"))),
        }
    }

    fn read_length(&mut self) -> Result<usize> {
        let length = self.read_u64()?;
        if length > MAX_LENGTH {
            return Err(Error::Corrupt(format!("长度 {length} 超出上限")));
        }
        Ok(length as usize)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_length()?;
        let mut bytes = vec![0u8; length];
        self.inner.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| Error::Corrupt(format!("字符串不是合法的 UTF-8：{e}")))
    }

    pub fn read_f64_vec(&mut self) -> Result<Vec<f64>> {
        let length = self.read_length()?;
        let mut values = Vec::with_capacity(length.min(1 << 16));
        for _ in 0..length {
            values.push(self.read_f64()?);
        }
        Ok(values)
    }
}
