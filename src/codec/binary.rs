//! Binary wire/replication format for roles.
//! ------------------------------------------
//! Layout of a role, fields in this exact order:
//!   name                 string
//!   privilege count      vint, then per privilege:
//!                          policy vint, permission vint, securable vint,
//!                          ident optional string, grantor string
//!   granted role count   vint, then per edge: role_name string, grantor string
//!   login                bool
//!   password             optional SecureHash (i32 iterations, byte_array hash, byte_array salt)
//!
//! Primitives: vint = 7-bit groups, low group first, 0x80 continuation; bool = one byte 0/1;
//! i32 = 4 bytes big-endian; string/byte_array = vint length + bytes (UTF-8 for strings);
//! optional = presence bool then the value. The superuser flag is never written.

use std::io::{Read, Write};

use tracing::debug;

use crate::config::CodecSettings;
use crate::error::{AclError, AclResult};
use crate::role::{
    GrantedRole, GrantedRoles, Permission, Policy, Privilege, PrivilegeSet, Properties, Role, Securable,
    SecureHash, Subject,
};

pub struct StreamOutput<W: Write> {
    inner: W,
}

impl<W: Write> StreamOutput<W> {
    pub fn new(inner: W) -> Self { Self { inner } }
    pub fn into_inner(self) -> W { self.inner }

    pub fn write_u8(&mut self, v: u8) -> AclResult<()> { self.inner.write_all(&[v])?; Ok(()) }
    pub fn write_bool(&mut self, v: bool) -> AclResult<()> { self.write_u8(v as u8) }
    pub fn write_i32(&mut self, v: i32) -> AclResult<()> { self.inner.write_all(&v.to_be_bytes())?; Ok(()) }

    pub fn write_vint(&mut self, mut v: u32) -> AclResult<()> {
        let mut buf = [0u8; 5];
        let mut n = 0;
        while v >= 0x80 {
            buf[n] = (v as u8 & 0x7F) | 0x80;
            v >>= 7;
            n += 1;
        }
        buf[n] = v as u8;
        self.inner.write_all(&buf[..=n])?;
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> AclResult<()> {
        let v = u32::try_from(len).map_err(|_| AclError::malformed("length", format!("{} does not fit a vint", len)))?;
        self.write_vint(v)
    }

    pub fn write_byte_array(&mut self, b: &[u8]) -> AclResult<()> {
        self.write_len(b.len())?;
        self.inner.write_all(b)?;
        Ok(())
    }

    pub fn write_string(&mut self, s: &str) -> AclResult<()> { self.write_byte_array(s.as_bytes()) }

    pub fn write_optional_string(&mut self, s: Option<&str>) -> AclResult<()> {
        self.write_bool(s.is_some())?;
        if let Some(s) = s { self.write_string(s)?; }
        Ok(())
    }

    pub fn write_optional<T: Writeable>(&mut self, v: Option<&T>) -> AclResult<()> {
        self.write_bool(v.is_some())?;
        if let Some(v) = v { v.write_to(self)?; }
        Ok(())
    }
}

pub struct StreamInput<R: Read> {
    inner: R,
    settings: CodecSettings,
}

impl<R: Read> StreamInput<R> {
    pub fn new(inner: R) -> Self { Self::with_settings(inner, CodecSettings::default()) }
    pub fn with_settings(inner: R, settings: CodecSettings) -> Self { Self { inner, settings } }
    pub fn into_inner(self) -> R { self.inner }

    pub fn read_u8(&mut self) -> AclResult<u8> {
        let mut b = [0u8; 1];
        self.inner.read_exact(&mut b)?;
        Ok(b[0])
    }

    pub fn read_bool(&mut self) -> AclResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(AclError::malformed("bool", format!("unexpected byte {:#04x}", other))),
        }
    }

    pub fn read_i32(&mut self) -> AclResult<i32> {
        let mut b = [0u8; 4];
        self.inner.read_exact(&mut b)?;
        Ok(i32::from_be_bytes(b))
    }

    pub fn read_vint(&mut self) -> AclResult<u32> {
        let mut v: u32 = 0;
        for shift in [0u32, 7, 14, 21, 28] {
            let b = self.read_u8()?;
            if shift == 28 && b & 0xF0 != 0 {
                return Err(AclError::malformed("vint", "value overflows 32 bits"));
            }
            v |= ((b & 0x7F) as u32) << shift;
            if b & 0x80 == 0 {
                return Ok(v);
            }
        }
        Err(AclError::malformed("vint", "more than 5 bytes"))
    }

    /// Collection count, bounded by `max_collection_len`.
    pub fn read_count(&mut self, context: &'static str) -> AclResult<usize> {
        let n = self.read_vint()? as usize;
        if n > self.settings.max_collection_len {
            return Err(AclError::malformed(context, format!("count {} exceeds limit {}", n, self.settings.max_collection_len)));
        }
        Ok(n)
    }

    pub fn read_byte_array(&mut self) -> AclResult<Vec<u8>> {
        let n = self.read_vint()? as usize;
        if n > self.settings.max_bytes_len {
            return Err(AclError::malformed("byte array", format!("length {} exceeds limit {}", n, self.settings.max_bytes_len)));
        }
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_string(&mut self) -> AclResult<String> {
        String::from_utf8(self.read_byte_array()?).map_err(|e| AclError::malformed("string", e.to_string()))
    }

    pub fn read_optional_string(&mut self) -> AclResult<Option<String>> {
        if self.read_bool()? { Ok(Some(self.read_string()?)) } else { Ok(None) }
    }

    pub fn read_optional<T: Readable>(&mut self) -> AclResult<Option<T>> {
        if self.read_bool()? { Ok(Some(T::read_from(self)?)) } else { Ok(None) }
    }
}

pub trait Writeable {
    fn write_to<W: Write>(&self, out: &mut StreamOutput<W>) -> AclResult<()>;
}

pub trait Readable: Sized {
    fn read_from<R: Read>(input: &mut StreamInput<R>) -> AclResult<Self>;
}

fn read_ordinal<R: Read, T>(input: &mut StreamInput<R>, context: &'static str, f: fn(u32) -> Option<T>) -> AclResult<T> {
    let v = input.read_vint()?;
    f(v).ok_or_else(|| AclError::malformed(context, format!("unknown ordinal {}", v)))
}

impl Writeable for SecureHash {
    fn write_to<W: Write>(&self, out: &mut StreamOutput<W>) -> AclResult<()> {
        out.write_i32(self.iterations())?;
        out.write_byte_array(self.hash())?;
        out.write_byte_array(self.salt())
    }
}

impl Readable for SecureHash {
    fn read_from<R: Read>(input: &mut StreamInput<R>) -> AclResult<Self> {
        let iterations = input.read_i32()?;
        let hash = input.read_byte_array()?;
        let salt = input.read_byte_array()?;
        Ok(SecureHash::new(iterations, hash, salt))
    }
}

impl Writeable for Privilege {
    fn write_to<W: Write>(&self, out: &mut StreamOutput<W>) -> AclResult<()> {
        out.write_vint(self.policy().ordinal())?;
        out.write_vint(self.permission().ordinal())?;
        out.write_vint(self.securable().ordinal())?;
        out.write_optional_string(self.ident())?;
        out.write_string(self.grantor())
    }
}

impl Readable for Privilege {
    fn read_from<R: Read>(input: &mut StreamInput<R>) -> AclResult<Self> {
        let policy = read_ordinal(input, "policy", Policy::from_ordinal)?;
        let permission = read_ordinal(input, "permission", Permission::from_ordinal)?;
        let securable = read_ordinal(input, "securable", Securable::from_ordinal)?;
        let ident = input.read_optional_string()?;
        let grantor = input.read_string()?;
        Ok(Privilege::new(policy, Subject::new(permission, securable, ident)?, grantor))
    }
}

impl Writeable for GrantedRole {
    fn write_to<W: Write>(&self, out: &mut StreamOutput<W>) -> AclResult<()> {
        out.write_string(self.role_name())?;
        out.write_string(self.grantor())
    }
}

impl Readable for GrantedRole {
    fn read_from<R: Read>(input: &mut StreamInput<R>) -> AclResult<Self> {
        let role_name = input.read_string()?;
        let grantor = input.read_string()?;
        Ok(GrantedRole::new(role_name, grantor))
    }
}

impl Writeable for Role {
    fn write_to<W: Write>(&self, out: &mut StreamOutput<W>) -> AclResult<()> {
        out.write_string(self.name())?;
        out.write_len(self.privileges().len())?;
        for privilege in self.privileges() {
            privilege.write_to(out)?;
        }
        out.write_len(self.granted_roles().len())?;
        for edge in self.granted_roles().iter() {
            edge.write_to(out)?;
        }
        out.write_bool(self.properties().login())?;
        out.write_optional(self.password())
    }
}

impl Readable for Role {
    fn read_from<R: Read>(input: &mut StreamInput<R>) -> AclResult<Self> {
        let name = input.read_string()?;
        let n = input.read_count("privileges")?;
        let mut privileges = PrivilegeSet::new();
        for _ in 0..n {
            privileges.insert(Privilege::read_from(input)?);
        }
        let n = input.read_count("granted roles")?;
        let mut granted_roles = GrantedRoles::new();
        for _ in 0..n {
            granted_roles.grant(GrantedRole::read_from(input)?);
        }
        let login = input.read_bool()?;
        let password = input.read_optional::<SecureHash>()?;
        let properties = Properties::new(&name, login, password)?;
        debug!(target: "clarium_acl::codec", "decoded role '{}': {} privileges, {} granted roles", name, privileges.len(), granted_roles.len());
        Role::from_parts(name, privileges, granted_roles, properties)
    }
}

impl Role {
    pub fn to_bytes(&self) -> AclResult<Vec<u8>> {
        let mut out = StreamOutput::new(Vec::new());
        self.write_to(&mut out)?;
        Ok(out.into_inner())
    }

    /// Decode one role; trailing bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> AclResult<Role> {
        let mut input = StreamInput::new(bytes);
        let role = Role::read_from(&mut input)?;
        let rest = input.into_inner();
        if !rest.is_empty() {
            return Err(AclError::malformed("role", format!("{} trailing bytes", rest.len())));
        }
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_vint(v: u32) -> Vec<u8> {
        let mut out = StreamOutput::new(Vec::new());
        out.write_vint(v).unwrap();
        out.into_inner()
    }

    #[test]
    fn vint_layout() {
        assert_eq!(encode_vint(0), vec![0x00]);
        assert_eq!(encode_vint(127), vec![0x7F]);
        assert_eq!(encode_vint(128), vec![0x80, 0x01]);
        assert_eq!(encode_vint(300), vec![0xAC, 0x02]);
        assert_eq!(encode_vint(u32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        for v in [0u32, 1, 127, 128, 16_383, 16_384, u32::MAX] {
            let bytes = encode_vint(v);
            assert_eq!(StreamInput::new(bytes.as_slice()).read_vint().unwrap(), v);
        }
    }

    #[test]
    fn vint_overflow_is_malformed() {
        let bytes = [0xFFu8, 0xFF, 0xFF, 0xFF, 0x1F];
        let err = StreamInput::new(&bytes[..]).read_vint().unwrap_err();
        assert!(matches!(err, AclError::Malformed { context: "vint", .. }));
    }

    #[test]
    fn bool_accepts_only_zero_and_one() {
        assert!(!StreamInput::new(&[0u8][..]).read_bool().unwrap());
        assert!(StreamInput::new(&[1u8][..]).read_bool().unwrap());
        assert!(StreamInput::new(&[2u8][..]).read_bool().is_err());
    }

    #[test]
    fn byte_array_limit() {
        let settings = CodecSettings { max_bytes_len: 3, ..CodecSettings::default() };
        let bytes = [4u8, 1, 2, 3, 4];
        let err = StreamInput::with_settings(&bytes[..], settings).read_byte_array().unwrap_err();
        assert!(matches!(err, AclError::Malformed { context: "byte array", .. }));
    }

    #[test]
    fn truncated_stream_is_io_error() {
        let err = StreamInput::new(&[5u8, b'a', b'b'][..]).read_string().unwrap_err();
        assert!(matches!(err, AclError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }
}
