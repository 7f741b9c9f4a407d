//! Live registry access through the Windows registry API.

use super::live::{LiveKey, LiveRegistry, LiveRoot};
use super::RegistryValue;
use regf::ValueType;
use std::io;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ};
use winreg::RegKey;

/// The local machine's registry, opened read-only.
#[derive(Debug, Default)]
pub struct WindowsRegistry;

impl LiveRegistry for WindowsRegistry {
    fn open_root(&self, root: LiveRoot) -> io::Result<Box<dyn LiveKey>> {
        let hkey = match root {
            LiveRoot::LocalMachine => HKEY_LOCAL_MACHINE,
            LiveRoot::CurrentUser => HKEY_CURRENT_USER,
            LiveRoot::Users => HKEY_USERS,
        };
        Ok(Box::new(WindowsKey(RegKey::predef(hkey))))
    }
}

struct WindowsKey(RegKey);

impl LiveKey for WindowsKey {
    fn enumerate_values(&self) -> io::Result<Vec<io::Result<RegistryValue>>> {
        Ok(self
            .0
            .enum_values()
            .map(|v| {
                v.map(|(name, value)| {
                    RegistryValue::new(name, ValueType::from_raw(value.vtype as u32), value.bytes)
                })
            })
            .collect())
    }

    fn enumerate_subkey_names(&self) -> io::Result<Vec<io::Result<String>>> {
        Ok(self.0.enum_keys().collect())
    }

    fn open_subkey(&self, name: &str) -> io::Result<Box<dyn LiveKey>> {
        let key = self.0.open_subkey_with_flags(name, KEY_READ)?;
        Ok(Box::new(WindowsKey(key)))
    }
}
