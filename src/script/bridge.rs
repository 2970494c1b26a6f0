//! Conversion between host values and Lua values.
//!
//! Primitives cross by value. Host objects cross as userdata wrapping the
//! same `Rc`, so a script that holds an event sees the host's live object,
//! not a copy.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use mlua::{
    AnyUserData, FromLua, IntoLua, Lua, MetaMethod, Result as LuaResult, Table, UserData,
    UserDataMethods, Value, Variadic,
};
use serde::Serialize;

use crate::error::BridgeError;

/// Nested tables deeper than this are rejected when read back from Lua.
const MAX_TABLE_DEPTH: usize = 32;

/// A host-side object exposed to scripts by reference.
///
/// Fields are read with `obj.name`; methods are called with `obj:name(...)`.
pub trait HostObject {
    fn type_name(&self) -> &'static str;

    fn field(&self, name: &str) -> Option<HostValue>;

    fn has_method(&self, _name: &str) -> bool {
        false
    }

    /// Invoke a method. Only called for names where `has_method` is true.
    fn call_method(&self, name: &str, _args: Vec<HostValue>) -> Result<HostValue, String> {
        Err(format!("{} has no method '{}'", self.type_name(), name))
    }
}

/// A host-native value.
#[derive(Clone, Default)]
pub enum HostValue {
    #[default]
    Nil,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    List(Vec<HostValue>),
    Map(BTreeMap<String, HostValue>),
    Object(Rc<dyn HostObject>),
}

impl HostValue {
    pub fn object<T: HostObject + 'static>(object: T) -> Self {
        HostValue::Object(Rc::new(object))
    }

    /// Convert any serializable value through its JSON data model.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Nil => "nil",
            HostValue::Bool(_) => "boolean",
            HostValue::Integer(_) => "integer",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::List(_) => "list",
            HostValue::Map(_) => "map",
            HostValue::Object(object) => object.type_name(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HostValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, HostValue::Nil)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Nil => write!(f, "Nil"),
            HostValue::Bool(b) => write!(f, "Bool({b})"),
            HostValue::Integer(i) => write!(f, "Integer({i})"),
            HostValue::Number(n) => write!(f, "Number({n})"),
            HostValue::String(s) => write!(f, "String({s:?})"),
            HostValue::List(items) => f.debug_tuple("List").field(items).finish(),
            HostValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
            HostValue::Object(object) => write!(f, "Object({})", object.type_name()),
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Nil, HostValue::Nil) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Integer(a), HostValue::Integer(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::List(a), HostValue::List(b)) => a == b,
            (HostValue::Map(a), HostValue::Map(b)) => a == b,
            (HostValue::Object(a), HostValue::Object(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i64> for HostValue {
    fn from(i: i64) -> Self {
        HostValue::Integer(i)
    }
}

impl From<i32> for HostValue {
    fn from(i: i32) -> Self {
        HostValue::Integer(i64::from(i))
    }
}

impl From<u32> for HostValue {
    fn from(i: u32) -> Self {
        HostValue::Integer(i64::from(i))
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(HostValue::Nil, Into::into)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(items: Vec<T>) -> Self {
        HostValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Rc<dyn HostObject>> for HostValue {
    fn from(object: Rc<dyn HostObject>) -> Self {
        HostValue::Object(object)
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => HostValue::Nil,
            Json::Bool(b) => HostValue::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => HostValue::Integer(i),
                None => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => HostValue::String(s),
            Json::Array(items) => HostValue::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => {
                HostValue::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// Userdata wrapper carrying a host object into Lua.
struct ObjectRef(Rc<dyn HostObject>);

impl UserData for ObjectRef {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::Index, |lua, this, key: String| {
            if let Some(value) = this.0.field(&key) {
                return value.into_lua(lua);
            }
            if !this.0.has_method(&key) {
                return Ok(Value::Nil);
            }
            let target = Rc::clone(&this.0);
            let method = lua.create_function(
                move |_, (_receiver, args): (Value, Variadic<HostValue>)| {
                    target
                        .call_method(&key, args.into_iter().collect())
                        .map_err(mlua::Error::RuntimeError)
                },
            )?;
            Ok(Value::Function(method))
        });

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("{}: host object", this.0.type_name()))
        });

        methods.add_meta_method(MetaMethod::Eq, |_, this, other: AnyUserData| {
            let same = match other.borrow::<ObjectRef>() {
                Ok(other) => std::ptr::addr_eq(Rc::as_ptr(&this.0), Rc::as_ptr(&other.0)),
                Err(_) => false,
            };
            Ok(same)
        });
    }
}

impl IntoLua for HostValue {
    fn into_lua(self, lua: &Lua) -> LuaResult<Value> {
        Ok(match self {
            HostValue::Nil => Value::Nil,
            HostValue::Bool(b) => Value::Boolean(b),
            HostValue::Integer(i) => Value::Integer(i),
            HostValue::Number(n) => Value::Number(n),
            HostValue::String(s) => Value::String(lua.create_string(&s)?),
            HostValue::List(items) => Value::Table(lua.create_sequence_from(items)?),
            HostValue::Map(map) => Value::Table(lua.create_table_from(map)?),
            HostValue::Object(object) => Value::UserData(lua.create_userdata(ObjectRef(object))?),
        })
    }
}

impl FromLua for HostValue {
    fn from_lua(value: Value, _lua: &Lua) -> LuaResult<Self> {
        value_to_host(value, 0)
    }
}

fn value_to_host(value: Value, depth: usize) -> LuaResult<HostValue> {
    match value {
        Value::Nil => Ok(HostValue::Nil),
        Value::Boolean(b) => Ok(HostValue::Bool(b)),
        Value::Integer(i) => Ok(HostValue::Integer(i)),
        Value::Number(n) => Ok(HostValue::Number(n)),
        Value::String(s) => Ok(HostValue::String(s.to_str()?.to_string())),
        Value::Table(table) => table_to_host(&table, depth + 1),
        Value::UserData(ud) => match ud.borrow::<ObjectRef>() {
            Ok(object) => Ok(HostValue::Object(Rc::clone(&object.0))),
            Err(_) => Err(conversion_error("value", "host value", "userdata")),
        },
        other => Err(conversion_error("value", "host value", other.type_name())),
    }
}

/// Sequences become lists; anything else becomes a string-keyed map.
fn table_to_host(table: &Table, depth: usize) -> LuaResult<HostValue> {
    if depth > MAX_TABLE_DEPTH {
        return Err(mlua::Error::RuntimeError(format!(
            "table nesting exceeds {MAX_TABLE_DEPTH} levels"
        )));
    }

    let len = table.raw_len();
    let mut entries = Vec::new();
    table.for_each::<Value, Value>(|key, value| {
        entries.push((key, value));
        Ok(())
    })?;

    if len > 0 && entries.len() == len {
        let mut items = vec![HostValue::Nil; len];
        for (key, value) in entries {
            match key {
                Value::Integer(i) if i >= 1 && (i as usize) <= len => {
                    items[i as usize - 1] = value_to_host(value, depth)?;
                }
                _ => return map_from_entries(table, depth),
            }
        }
        return Ok(HostValue::List(items));
    }

    let mut map = BTreeMap::new();
    for (key, value) in entries {
        map.insert(key_to_string(&key)?, value_to_host(value, depth)?);
    }
    Ok(HostValue::Map(map))
}

fn map_from_entries(table: &Table, depth: usize) -> LuaResult<HostValue> {
    let mut map = BTreeMap::new();
    table.for_each::<Value, Value>(|key, value| {
        map.insert(key_to_string(&key)?, value_to_host(value, depth)?);
        Ok(())
    })?;
    Ok(HostValue::Map(map))
}

fn key_to_string(key: &Value) -> LuaResult<String> {
    match key {
        Value::String(s) => Ok(s.to_str()?.to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        other => Err(conversion_error("key", "string or integer", other.type_name())),
    }
}

fn conversion_error(field: &str, expected: &'static str, found: &str) -> mlua::Error {
    mlua::Error::external(BridgeError::TypeError {
        field: field.to_string(),
        expected,
        found: found.to_string(),
    })
}

fn type_error(field: &str, expected: &'static str, value: &Value) -> BridgeError {
    BridgeError::TypeError {
        field: field.to_string(),
        expected,
        found: value.type_name().to_string(),
    }
}

fn read_field(table: &Table, field: &str) -> Result<Value, BridgeError> {
    table.get::<Value>(field).map_err(|e| BridgeError::TypeError {
        field: field.to_string(),
        expected: "readable field",
        found: e.to_string(),
    })
}

fn value_as_string(field: &str, value: Value) -> Result<String, BridgeError> {
    match &value {
        Value::Nil => Err(BridgeError::MissingField(field.to_string())),
        Value::String(s) => s
            .to_str()
            .map(|s| s.to_string())
            .map_err(|_| type_error(field, "utf-8 string", &value)),
        _ => Err(type_error(field, "string", &value)),
    }
}

/// Read `table[field]` as a string.
///
/// Nil is [`BridgeError::MissingField`]; any other non-string is a type error.
pub fn required_string(table: &Table, field: &str) -> Result<String, BridgeError> {
    let value = read_field(table, field)?;
    value_as_string(field, value)
}

/// Read `table[index]` (1-based) as a string, labelling errors `field[index]`.
pub fn required_string_at(table: &Table, index: usize, field: &str) -> Result<String, BridgeError> {
    let label = format!("{field}[{index}]");
    let value = table.get::<Value>(index).map_err(|e| BridgeError::TypeError {
        field: label.clone(),
        expected: "readable field",
        found: e.to_string(),
    })?;
    value_as_string(&label, value)
}

/// Read `table[field]` as an integer, or `default` when it is nil.
///
/// Floats with no fractional part are accepted.
pub fn optional_integer(table: &Table, field: &str, default: i64) -> Result<i64, BridgeError> {
    let value = read_field(table, field)?;
    match value {
        Value::Nil => Ok(default),
        Value::Integer(i) => Ok(i),
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 => Ok(n as i64),
        other => Err(type_error(field, "integer", &other)),
    }
}

/// Read `table[field]` as a nested table.
pub fn required_table(table: &Table, field: &str) -> Result<Table, BridgeError> {
    match read_field(table, field)? {
        Value::Table(t) => Ok(t),
        Value::Nil => Err(BridgeError::MissingField(field.to_string())),
        other => Err(type_error(field, "table", &other)),
    }
}

/// Whether `table[field]` is nil.
pub fn is_absent(table: &Table, field: &str) -> Result<bool, BridgeError> {
    Ok(read_field(table, field)?.is_nil())
}

/// All keys of `table`: integers ascending, then strings ascending, then
/// any other keys in traversal order.
pub fn table_keys(table: &Table) -> Result<Vec<Value>, BridgeError> {
    let mut integers = Vec::new();
    let mut strings = Vec::new();
    let mut others = Vec::new();

    table
        .for_each::<Value, Value>(|key, _| {
            match key {
                Value::Integer(i) => integers.push(i),
                Value::String(s) => {
                    let name = s.to_str()?.to_string();
                    strings.push((name, Value::String(s)));
                }
                other => others.push(other),
            }
            Ok(())
        })
        .map_err(|e| BridgeError::TypeError {
            field: "<keys>".to_string(),
            expected: "iterable table",
            found: e.to_string(),
        })?;

    integers.sort_unstable();
    strings.sort_by(|a, b| a.0.cmp(&b.0));

    let mut keys: Vec<Value> = integers.into_iter().map(Value::Integer).collect();
    keys.extend(strings.into_iter().map(|(_, key)| key));
    keys.extend(others);
    Ok(keys)
}
