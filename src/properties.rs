//! 代价函数参数块的解析
//!
//! 参数块的形式为 `{ key: value, key: value }`，各条目之间可以用逗号、分号、换行或空白分隔。
//! 语法由所有代价函数共用，但每种代价函数各自声明允许的参数名及其默认值。

use crate::error::{Error, Result};
use itertools::Itertools;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// 一个参数的名称和默认值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub default: f64,
}

/// 参数块中的一个条目，记录了键在原文中的字节位置
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub key: String,
    pub value: f64,
    pub position: usize,
}

/// 经过校验的参数表，所有声明过的参数都有值
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CostConfig {
    values: BTreeMap<String, f64>,
}

impl CostConfig {
    /// 用默认值填满参数表
    pub fn defaults(specs: &[ParameterSpec]) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.name.to_string(), spec.default))
            .collect();
        Self { values }
    }

    /// 解析参数块，并按照允许的参数列表进行校验
    pub fn parse(text: &str, specs: &[ParameterSpec]) -> Result<Self> {
        let mut config = Self::defaults(specs);
        let mut seen: Vec<&str> = vec![];
        for RawEntry {
            key,
            value,
            position,
        } in parse_block(text)?
        {
            let Some(spec) = specs.iter().find(|spec| spec.name == key) else {
                let known = specs.iter().map(|spec| spec.name).join("、");
                return Err(Error::parse(
                    format!("未知的参数 {key}，可用的参数有：{known}"),
                    key,
                    position,
                ));
            };
            if seen.contains(&spec.name) {
                return Err(Error::parse(format!("参数 {key} 重复出现"), key, position));
            }
            seen.push(spec.name);
            config.values.insert(key, value);
        }
        Ok(config)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Display for CostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.values.is_empty() {
            return f.write_str("{}");
        }
        let entries = self.iter().map(|(k, v)| format!("{k}: {v}")).join(", ");
        write!(f, "{{ {entries} }}")
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

fn is_token_end(c: char) -> bool {
    is_separator(c) || c == '}' || c == ':'
}

struct Cursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.position += c.len_utf8();
        }
    }

    fn skip_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.bump();
        }
    }

    /// 读取到下一个分隔符、冒号或右花括号为止
    fn token(&mut self) -> (&'a str, usize) {
        let text = self.text;
        let start = self.position;
        self.skip_while(|c| !is_token_end(c));
        (&text[start..self.position], start)
    }
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// 只做语法分析，不校验参数名
pub fn parse_block(text: &str) -> Result<Vec<RawEntry>> {
    let mut cursor = Cursor { text, position: 0 };
    cursor.skip_while(char::is_whitespace);
    match cursor.peek() {
        None => return Ok(vec![]),
        Some('{') => cursor.bump(),
        Some(_) => {
            let (token, position) = cursor.token();
            return Err(Error::parse("参数块应当以 { 开头", token, position));
        }
    }
    let mut entries = vec![];
    loop {
        cursor.skip_while(is_separator);
        match cursor.peek() {
            None => return Err(Error::parse("缺少右花括号 }", "", text.len())),
            Some('}') => {
                cursor.bump();
                break;
            }
            Some(_) => {}
        }
        let (key, position) = cursor.token();
        if !is_identifier(key) {
            let token = if key.is_empty() {
                cursor.text[cursor.position..].chars().take(1).collect()
            } else {
                key.to_string()
            };
            return Err(Error::parse("参数名不合法", token, position));
        }
        cursor.skip_while(char::is_whitespace);
        if cursor.peek() != Some(':') {
            return Err(Error::parse(
                format!("参数 {key} 后缺少冒号"),
                key,
                position,
            ));
        }
        cursor.bump();
        cursor.skip_while(char::is_whitespace);
        let (raw, value_position) = cursor.token();
        if raw.is_empty() {
            return Err(Error::parse(
                format!("参数 {key} 缺少取值"),
                key,
                value_position,
            ));
        }
        let value = raw.parse::<f64>().map_err(|_| {
            Error::parse(format!("参数 {key} 的取值不是数"), raw, value_position)
        })?;
        entries.push(RawEntry {
            key: key.to_string(),
            value,
            position,
        });
    }
    cursor.skip_while(char::is_whitespace);
    if cursor.peek().is_some() {
        let position = cursor.position;
        let rest = cursor.text[position..].trim_end().to_string();
        return Err(Error::parse("右花括号之后还有多余的内容", rest, position));
    }
    Ok(entries)
}

/// 把 `type_name { ... }` 拆成类型名和参数块，参数块可以省略
pub fn split_named(text: &str) -> Result<(String, String)> {
    let pattern = Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(\{[\s\S]*\})?\s*$")
        .map_err(|e| Error::Message(e.to_string()))?;
    let captures = pattern.captures(text).ok_or_else(|| {
        let token = text.split_whitespace().next().unwrap_or_default();
        let position = text.find(token).unwrap_or(0);
        Error::parse("应当为“类型名 { 参数 }”的形式", token, position)
    })?;
    let name = captures[1].to_string();
    let block = captures
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Ok((name, block))
}
