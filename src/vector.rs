//! 数值向量
//!
//! 代价函数只依赖向量的极少部分能力：从原始数据构造、按下标访问、判等、
//! 二进制读写，以及构造单位向量。矩阵运算不在此列。

use crate::error::{Error, Result};
use crate::io::{BinaryReader, BinaryWriter};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::{Read, Write};
use std::ops::Index;

pub const VECTOR_IO_VERSION: u16 = 1;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// 把给定方向归一化为单位向量，零向量没有方向
    pub fn unit(data: Vec<f64>) -> Result<Self> {
        let vector = Self::new(data);
        let norm = vector.norm();
        if vector.is_empty() || norm == 0.0 || !norm.is_finite() {
            return Err(Error::InvalidVector(format!(
                "长度为 {} 的向量无法归一化（模长 {norm}）",
                vector.len()
            )));
        }
        Ok(Self::new(vector.data.iter().map(|x| x / norm).collect()))
    }

    /// 第 index 个坐标轴方向上的单位向量
    pub fn axis(length: usize, index: usize) -> Result<Self> {
        if index >= length {
            return Err(Error::InvalidVector(format!(
                "坐标轴 {index} 超出维数 {length}"
            )));
        }
        let mut data = vec![0.0; length];
        data[index] = 1.0;
        Ok(Self::new(data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter()
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum()
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn b_write<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<()> {
        writer.write_u16(VECTOR_IO_VERSION)?;
        writer.write_f64_slice(&self.data)
    }

    pub fn b_read<R: Read>(reader: &mut BinaryReader<R>) -> Result<Self> {
        let version = reader.read_u16()?;
        match version {
            1 => Ok(Self::new(reader.read_f64_vec()?)),
            found => Err(Error::UnsupportedVersion {
                type_name: "vector".to_string(),
                found,
                supported: VECTOR_IO_VERSION,
            }),
        }
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.data[index]
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (index, value) in self.data.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

/// 标量的二进制读写，与向量共用同一套流原语
pub fn b_write_scalar<W: Write>(writer: &mut BinaryWriter<W>, value: f64) -> Result<()> {
    writer.write_f64(value)
}

pub fn b_read_scalar<R: Read>(reader: &mut BinaryReader<R>) -> Result<f64> {
    reader.read_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_vector_has_length_one() {
        let v = Vector::unit(vec![3.0, 4.0]).unwrap();
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert_eq!(v[0], 0.6);
        assert!(Vector::unit(vec![0.0, 0.0]).is_err());
        assert!(Vector::unit(vec![]).is_err());
    }

    #[test]
    fn vector_and_scalar_survive_binary_io() {
        let v = Vector::new(vec![1.1, 1.2, 2.1, 2.2]);
        let mut writer = BinaryWriter::new(Vec::new());
        v.b_write(&mut writer).unwrap();
        b_write_scalar(&mut writer, 3.5).unwrap();
        let bytes = writer.into_inner();

        let mut reader = BinaryReader::new(bytes.as_slice());
        assert_eq!(Vector::b_read(&mut reader).unwrap(), v);
        assert_eq!(b_read_scalar(&mut reader).unwrap(), 3.5);
    }

    #[test]
    fn unknown_vector_version_is_rejected() {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write_u16(VECTOR_IO_VERSION + 1).unwrap();
        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(bytes.as_slice());
        assert!(matches!(
            Vector::b_read(&mut reader),
            Err(Error::UnsupportedVersion { .. })
        ));
    }
}
