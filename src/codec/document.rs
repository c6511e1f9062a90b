//! Structured document format for roles (persistence and introspection).
//! ----------------------------------------------------------------------
//! A role is stored as a single field keyed by its name:
//!
//! ```text
//! "role1": {
//!   "privileges": [
//!     {"policy": 1, "permission": 2, "securable": 3, "ident": "some_table", "grantor": "grantor_username"}, ...
//!   ],
//!   "granted_roles": [{"role": "role2", "grantor": "grantor1"}, ...],
//!   "properties": {
//!     "login": true,
//!     "secure_hash": {"iterations": INT, "hash": BASE64, "salt": BASE64}
//!   }
//! }
//! ```
//!
//! Parsing is a single pass over a pull-style token cursor; writing emits the mirror-image
//! token stream through `DocumentBuilder`. JSON is only a carrier: `to_json`/`from_json`
//! convert between tokens and `serde_json::Value`.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{AclError, AclResult};
use crate::role::{
    GrantedRole, GrantedRoles, Permission, Policy, Privilege, PrivilegeSet, Properties, Role, Securable,
    SecureHash, Subject,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName(String),
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartObject => f.write_str("START_OBJECT"),
            Token::EndObject => f.write_str("END_OBJECT"),
            Token::StartArray => f.write_str("START_ARRAY"),
            Token::EndArray => f.write_str("END_ARRAY"),
            Token::FieldName(n) => write!(f, "FIELD_NAME({})", n),
            Token::Null => f.write_str("VALUE_NULL"),
            Token::Bool(_) => f.write_str("VALUE_BOOLEAN"),
            Token::Int(_) => f.write_str("VALUE_NUMBER"),
            Token::Str(_) => f.write_str("VALUE_STRING"),
        }
    }
}

/// Pull cursor over a token stream. Starts before the first token.
pub struct TokenCursor {
    tokens: std::vec::IntoIter<Token>,
    current: Option<Token>,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self { Self { tokens: tokens.into_iter(), current: None } }

    pub fn next_token(&mut self) -> Option<&Token> {
        self.current = self.tokens.next();
        self.current.as_ref()
    }

    pub fn current_token(&self) -> Option<&Token> { self.current.as_ref() }

    pub fn current_name(&self) -> Option<&str> {
        match &self.current { Some(Token::FieldName(n)) => Some(n), _ => None }
    }

    /// Advance and return the field name if the new token is one.
    fn next_field_name(&mut self) -> Option<String> {
        match self.next_token() { Some(Token::FieldName(n)) => Some(n.clone()), _ => None }
    }

    fn describe_current(&self) -> String {
        self.current.as_ref().map_or_else(|| "END_OF_STREAM".to_string(), Token::to_string)
    }

    fn unexpected(&self, context: &str, expected: &'static str) -> AclError {
        AclError::UnexpectedToken { context: context.to_string(), expected, found: self.describe_current() }
    }

    fn is_current(&self, t: &Token) -> bool { self.current.as_ref() == Some(t) }

    fn expect_next(&mut self, t: Token, context: &str, expected: &'static str) -> AclResult<()> {
        self.next_token();
        if self.is_current(&t) { Ok(()) } else { Err(self.unexpected(context, expected)) }
    }

    fn next_bool(&mut self, context: &str) -> AclResult<bool> {
        match self.next_token() { Some(Token::Bool(b)) => Ok(*b), _ => Err(self.unexpected(context, "a boolean value")) }
    }

    fn next_int(&mut self, context: &str) -> AclResult<i64> {
        match self.next_token() { Some(Token::Int(v)) => Ok(*v), _ => Err(self.unexpected(context, "a number value")) }
    }

    fn next_str(&mut self, context: &str) -> AclResult<String> {
        match self.next_token() { Some(Token::Str(s)) => Ok(s.clone()), _ => Err(self.unexpected(context, "a string value")) }
    }

    fn next_opt_str(&mut self, context: &str) -> AclResult<Option<String>> {
        match self.next_token() {
            Some(Token::Str(s)) => Ok(Some(s.clone())),
            Some(Token::Null) => Ok(None),
            _ => Err(self.unexpected(context, "a string or null value")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame { Object, Array }

/// Emits a balanced token stream. Misuse (unbalanced ends, a field outside an object)
/// is recorded and reported by `finish`.
#[derive(Default)]
pub struct DocumentBuilder {
    tokens: Vec<Token>,
    stack: Vec<Frame>,
    misuse: Option<String>,
}

impl DocumentBuilder {
    pub fn new() -> Self { Self::default() }

    fn push(&mut self, t: Token) -> &mut Self { self.tokens.push(t); self }

    fn fail(&mut self, msg: String) -> &mut Self {
        self.misuse.get_or_insert(msg);
        self
    }

    fn open(&mut self, frame: Frame, t: Token) -> &mut Self {
        self.stack.push(frame);
        self.push(t)
    }

    fn close(&mut self, frame: Frame, t: Token) -> &mut Self {
        match self.stack.pop() {
            Some(f) if f == frame => self.push(t),
            other => self.fail(format!("cannot close {:?} while in {:?}", frame, other)),
        }
    }

    fn name(&mut self, name: &str) -> &mut Self {
        if self.stack.last() != Some(&Frame::Object) {
            return self.fail(format!("field '{}' written outside an object", name));
        }
        self.push(Token::FieldName(name.to_string()))
    }

    pub fn start_object(&mut self) -> &mut Self { self.open(Frame::Object, Token::StartObject) }
    pub fn start_named_object(&mut self, name: &str) -> &mut Self { self.name(name).start_object() }
    pub fn end_object(&mut self) -> &mut Self { self.close(Frame::Object, Token::EndObject) }
    pub fn start_named_array(&mut self, name: &str) -> &mut Self { self.name(name).open(Frame::Array, Token::StartArray) }
    pub fn end_array(&mut self) -> &mut Self { self.close(Frame::Array, Token::EndArray) }

    pub fn field(&mut self, name: &str, value: Token) -> &mut Self { self.name(name).push(value) }

    pub fn finish(self) -> AclResult<Vec<Token>> {
        if let Some(msg) = self.misuse {
            return Err(AclError::malformed("document", msg));
        }
        if !self.stack.is_empty() {
            return Err(AclError::malformed("document", format!("{} unclosed containers", self.stack.len())));
        }
        Ok(self.tokens)
    }
}

// ---- writing ----

fn write_privilege(p: &Privilege, b: &mut DocumentBuilder) {
    b.start_object()
        .field("policy", Token::Int(p.policy().ordinal() as i64))
        .field("permission", Token::Int(p.permission().ordinal() as i64))
        .field("securable", Token::Int(p.securable().ordinal() as i64))
        .field("ident", p.ident().map_or(Token::Null, |i| Token::Str(i.to_string())))
        .field("grantor", Token::Str(p.grantor().to_string()))
        .end_object();
}

fn write_granted_role(g: &GrantedRole, b: &mut DocumentBuilder) {
    b.start_object()
        .field("role", Token::Str(g.role_name().to_string()))
        .field("grantor", Token::Str(g.grantor().to_string()))
        .end_object();
}

fn write_properties(p: &Properties, b: &mut DocumentBuilder) {
    b.start_named_object("properties").field("login", Token::Bool(p.login()));
    if let Some(h) = p.password() {
        b.start_named_object("secure_hash")
            .field("iterations", Token::Int(h.iterations() as i64))
            .field("hash", Token::Str(STANDARD.encode(h.hash())))
            .field("salt", Token::Str(STANDARD.encode(h.salt())))
            .end_object();
    }
    b.end_object();
}

/// Write `role` as a field of the enclosing object.
pub fn write_role(role: &Role, b: &mut DocumentBuilder) {
    b.start_named_object(role.name()).start_named_array("privileges");
    for p in role.privileges() {
        write_privilege(p, b);
    }
    b.end_array().start_named_array("granted_roles");
    for g in role.granted_roles().iter() {
        write_granted_role(&g, b);
    }
    b.end_array();
    write_properties(role.properties(), b);
    b.end_object();
}

// ---- parsing ----

fn ordinal<T>(v: i64, context: &'static str, f: fn(u32) -> Option<T>) -> AclResult<T> {
    u32::try_from(v).ok().and_then(f).ok_or_else(|| AclError::malformed(context, format!("unknown ordinal {}", v)))
}

fn decode_b64(s: &str, context: &'static str) -> AclResult<Vec<u8>> {
    STANDARD.decode(s).map_err(|e| AclError::malformed(context, e.to_string()))
}

/// Expects the cursor on START_OBJECT; leaves it on the matching END_OBJECT.
fn parse_privilege(p: &mut TokenCursor) -> AclResult<Privilege> {
    const CTX: &str = "a privilege";
    if !p.is_current(&Token::StartObject) {
        return Err(p.unexpected(CTX, "a start object token"));
    }
    let (mut policy, mut permission, mut securable) = (None, None, None);
    let (mut ident, mut grantor) = (None, None);
    while let Some(field) = p.next_field_name() {
        match field.as_str() {
            "policy" => policy = Some(ordinal(p.next_int(CTX)?, "policy", Policy::from_ordinal)?),
            "permission" => permission = Some(ordinal(p.next_int(CTX)?, "permission", Permission::from_ordinal)?),
            "securable" => securable = Some(ordinal(p.next_int(CTX)?, "securable", Securable::from_ordinal)?),
            "ident" => ident = p.next_opt_str(CTX)?,
            "grantor" => grantor = Some(p.next_str(CTX)?),
            _ => return Err(AclError::UnexpectedField { context: CTX, field }),
        }
    }
    if !p.is_current(&Token::EndObject) {
        return Err(p.unexpected(CTX, "an end object token"));
    }
    let policy = policy.ok_or(AclError::NotFound { context: "privilege policy" })?;
    let permission = permission.ok_or(AclError::NotFound { context: "privilege permission" })?;
    let securable = securable.ok_or(AclError::NotFound { context: "privilege securable" })?;
    let grantor = grantor.ok_or(AclError::NotFound { context: "privilege grantor" })?;
    Ok(Privilege::new(policy, Subject::new(permission, securable, ident)?, grantor))
}

fn parse_granted_role(p: &mut TokenCursor) -> AclResult<GrantedRole> {
    const CTX: &str = "a granted role";
    if !p.is_current(&Token::StartObject) {
        return Err(p.unexpected(CTX, "a start object token"));
    }
    let (mut role, mut grantor) = (None, None);
    while let Some(field) = p.next_field_name() {
        match field.as_str() {
            "role" => role = Some(p.next_str(CTX)?),
            "grantor" => grantor = Some(p.next_str(CTX)?),
            _ => return Err(AclError::UnexpectedField { context: CTX, field }),
        }
    }
    if !p.is_current(&Token::EndObject) {
        return Err(p.unexpected(CTX, "an end object token"));
    }
    let role = role.ok_or(AclError::NotFound { context: "granted role name" })?;
    let grantor = grantor.ok_or(AclError::NotFound { context: "granted role grantor" })?;
    Ok(GrantedRole::new(role, grantor))
}

/// Cursor is on the `secure_hash` field name; leaves it on the object's END_OBJECT.
fn parse_secure_hash(p: &mut TokenCursor) -> AclResult<SecureHash> {
    const CTX: &str = "a secure hash";
    p.expect_next(Token::StartObject, CTX, "a start object token")?;
    let (mut iterations, mut hash, mut salt) = (None, None, None);
    while let Some(field) = p.next_field_name() {
        match field.as_str() {
            "iterations" => {
                let v = p.next_int(CTX)?;
                iterations = Some(i32::try_from(v).map_err(|_| AclError::malformed("secure hash", format!("iterations {} out of range", v)))?);
            }
            "hash" => hash = Some(decode_b64(&p.next_str(CTX)?, "secure hash")?),
            "salt" => salt = Some(decode_b64(&p.next_str(CTX)?, "secure hash")?),
            _ => return Err(AclError::UnexpectedField { context: CTX, field }),
        }
    }
    if !p.is_current(&Token::EndObject) {
        return Err(p.unexpected(CTX, "an end object token"));
    }
    let iterations = iterations.ok_or(AclError::NotFound { context: "secure hash iterations" })?;
    let hash = hash.ok_or(AclError::NotFound { context: "secure hash bytes" })?;
    let salt = salt.ok_or(AclError::NotFound { context: "secure hash salt" })?;
    Ok(SecureHash::new(iterations, hash, salt))
}

/// Cursor is on the properties START_OBJECT; stops on the first non field-name token.
fn parse_properties(p: &mut TokenCursor, role_name: &str) -> AclResult<Properties> {
    let mut login = false;
    let mut password = None;
    while let Some(field) = p.next_field_name() {
        match field.as_str() {
            "login" => login = p.next_bool("role properties")?,
            "secure_hash" => password = Some(parse_secure_hash(p)?),
            _ => return Err(AclError::UnexpectedField { context: "role properties", field }),
        }
    }
    Properties::new(role_name, login, password)
}

/// Parse one role. The cursor must be on the FIELD_NAME token carrying the role name;
/// on success it is left on the role object's END_OBJECT.
pub fn parse_role(p: &mut TokenCursor) -> AclResult<Role> {
    const CTX: &str = "a role";
    let name = match p.current_name() {
        Some(n) => n.to_string(),
        None => return Err(p.unexpected(CTX, "the current token to be a field name")),
    };
    let mut properties = None;
    let mut privileges = PrivilegeSet::new();
    let mut granted_roles = GrantedRoles::new();

    if matches!(p.next_token(), Some(Token::StartObject)) {
        while let Some(field) = p.next_field_name() {
            match field.as_str() {
                "properties" => {
                    p.expect_next(Token::StartObject, CTX, "a start object token for properties")?;
                    properties = Some(parse_properties(p, &name)?);
                    if !p.is_current(&Token::EndObject) {
                        return Err(p.unexpected(CTX, "an end object token for properties"));
                    }
                }
                "privileges" => {
                    p.expect_next(Token::StartArray, CTX, "an array token for privileges")?;
                    loop {
                        match p.next_token() {
                            Some(Token::EndArray) => break,
                            _ => { privileges.insert(parse_privilege(p)?); }
                        }
                    }
                }
                "granted_roles" => {
                    p.expect_next(Token::StartArray, CTX, "an array token for granted_roles")?;
                    loop {
                        match p.next_token() {
                            Some(Token::EndArray) => break,
                            _ => { granted_roles.grant(parse_granted_role(p)?); }
                        }
                    }
                }
                _ => return Err(AclError::UnexpectedField { context: CTX, field }),
            }
        }
        if !p.is_current(&Token::EndObject) {
            return Err(p.unexpected(CTX, "an object token at the end"));
        }
    }
    let properties = properties.ok_or(AclError::NotFound { context: "role properties" })?;
    debug!(target: "clarium_acl::codec", "parsed role '{}': {} privileges, {} granted roles", name, privileges.len(), granted_roles.len());
    Role::from_parts(name, privileges, granted_roles, properties)
}

// ---- JSON carrier ----

pub fn tokens_from_json(v: &Value) -> AclResult<Vec<Token>> {
    fn walk(v: &Value, out: &mut Vec<Token>) -> AclResult<()> {
        match v {
            Value::Null => out.push(Token::Null),
            Value::Bool(b) => out.push(Token::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => out.push(Token::Int(i)),
                None => return Err(AclError::malformed("document", format!("unsupported number {}", n))),
            },
            Value::String(s) => out.push(Token::Str(s.clone())),
            Value::Array(items) => {
                out.push(Token::StartArray);
                for item in items { walk(item, out)?; }
                out.push(Token::EndArray);
            }
            Value::Object(map) => {
                out.push(Token::StartObject);
                for (k, item) in map {
                    out.push(Token::FieldName(k.clone()));
                    walk(item, out)?;
                }
                out.push(Token::EndObject);
            }
        }
        Ok(())
    }
    let mut out = Vec::new();
    walk(v, &mut out)?;
    Ok(out)
}

pub fn tokens_to_json(tokens: Vec<Token>) -> AclResult<Value> {
    fn value(p: &mut TokenCursor) -> AclResult<Value> {
        let v = match p.current_token().cloned() {
            Some(Token::Null) => Value::Null,
            Some(Token::Bool(b)) => Value::Bool(b),
            Some(Token::Int(i)) => Value::Number(Number::from(i)),
            Some(Token::Str(s)) => Value::String(s),
            Some(Token::StartArray) => {
                let mut items = Vec::new();
                while !matches!(p.next_token(), Some(Token::EndArray)) {
                    items.push(value(p)?);
                }
                Value::Array(items)
            }
            Some(Token::StartObject) => {
                let mut map = Map::new();
                while let Some(k) = p.next_field_name() {
                    p.next_token();
                    let v = value(p)?;
                    if map.contains_key(&k) {
                        return Err(AclError::malformed("document", format!("duplicate field '{}'", k)));
                    }
                    map.insert(k, v);
                }
                if !p.is_current(&Token::EndObject) {
                    return Err(p.unexpected("a document", "a field name or end object token"));
                }
                Value::Object(map)
            }
            _ => return Err(p.unexpected("a document", "a value")),
        };
        Ok(v)
    }
    let mut p = TokenCursor::new(tokens);
    p.next_token();
    let v = value(&mut p)?;
    if p.next_token().is_some() {
        return Err(p.unexpected("a document", "the end of the stream"));
    }
    Ok(v)
}

/// `{"<name>": {...}}`
pub fn to_json(role: &Role) -> AclResult<Value> {
    roles_to_json(std::iter::once(role))
}

/// Several roles as fields of one object, the layout of the cluster's role metadata.
pub fn roles_to_json<'a>(roles: impl IntoIterator<Item = &'a Role>) -> AclResult<Value> {
    let mut b = DocumentBuilder::new();
    b.start_object();
    for role in roles {
        write_role(role, &mut b);
    }
    b.end_object();
    tokens_to_json(b.finish()?)
}

pub fn roles_from_json(v: &Value) -> AclResult<Vec<Role>> {
    let mut p = TokenCursor::new(tokens_from_json(v)?);
    p.expect_next(Token::StartObject, "roles", "a start object token")?;
    let mut roles = Vec::new();
    while p.next_field_name().is_some() {
        roles.push(parse_role(&mut p)?);
    }
    if !p.is_current(&Token::EndObject) {
        return Err(p.unexpected("roles", "an end object token"));
    }
    Ok(roles)
}

/// Exactly one role.
pub fn from_json(v: &Value) -> AclResult<Role> {
    let mut p = TokenCursor::new(tokens_from_json(v)?);
    p.expect_next(Token::StartObject, "a role document", "a start object token")?;
    p.next_token();
    let role = parse_role(&mut p)?;
    p.expect_next(Token::EndObject, "a role document", "an end object token")?;
    Ok(role)
}

pub fn to_json_string(role: &Role) -> AclResult<String> { Ok(serde_json::to_string(&to_json(role)?)?) }

pub fn from_json_str(s: &str) -> AclResult<Role> { from_json(&serde_json::from_str(s)?) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_unbalanced_output() {
        let mut b = DocumentBuilder::new();
        b.start_object().start_named_array("a");
        assert!(b.finish().is_err());

        let mut b = DocumentBuilder::new();
        b.start_object().end_array();
        assert!(b.finish().is_err());

        let mut b = DocumentBuilder::new();
        b.field("loose", Token::Null);
        assert!(b.finish().is_err());
    }

    #[test]
    fn json_token_bridge_preserves_structure() {
        let v: Value = serde_json::from_str(r#"{"b": [1, true, null, "x"], "a": {}}"#).unwrap();
        let tokens = tokens_from_json(&v).unwrap();
        assert_eq!(tokens[0], Token::StartObject);
        assert_eq!(tokens[1], Token::FieldName("b".into()));
        assert_eq!(tokens_to_json(tokens).unwrap(), v);
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let tokens = vec![
            Token::StartObject,
            Token::FieldName("u".into()),
            Token::Bool(true),
            Token::FieldName("u".into()),
            Token::Bool(false),
            Token::EndObject,
        ];
        let err = tokens_to_json(tokens).unwrap_err();
        assert_eq!(err.to_string(), "malformed document: duplicate field 'u'");
    }

    #[test]
    fn floats_are_not_document_tokens() {
        let v: Value = serde_json::from_str(r#"{"x": 1.5}"#).unwrap();
        assert!(matches!(tokens_from_json(&v), Err(AclError::Malformed { .. })));
    }

    #[test]
    fn parse_role_requires_field_name_first() {
        let mut p = TokenCursor::new(vec![Token::StartObject, Token::EndObject]);
        p.next_token();
        let err = parse_role(&mut p).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to parse a role, expected the current token to be a field name but got START_OBJECT"
        );
    }

    #[test]
    fn token_display_names_kind() {
        assert_eq!(Token::Int(3).to_string(), "VALUE_NUMBER");
        assert_eq!(Token::FieldName("login".into()).to_string(), "FIELD_NAME(login)");
    }
}
