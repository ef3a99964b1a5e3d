//! Big-endian encoding of fixed-layout on-disk records.

use std::convert::TryInto;
use std::io::{Error, ErrorKind, Read, Result, Write};

pub trait Codec: Sized {
    /// The number of bytes this value occupies at rest.
    const SIZE: usize;

    fn decode(reader: impl Read) -> Result<Self>;
    fn encode(&self, writer: impl Write) -> Result<()>;
}

impl<T: Codec, const N: usize> Codec for [T; N] {
    const SIZE: usize = T::SIZE * N;

    #[inline]
    fn decode(mut reader: impl Read) -> Result<Self> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode(&mut reader)?);
        }

        items
            .try_into()
            .map_err(|_| Error::from(ErrorKind::InvalidData))
    }

    #[inline]
    fn encode(&self, mut writer: impl Write) -> Result<()> {
        for item in self {
            item.encode(&mut writer)?;
        }

        Ok(())
    }
}

macro_rules! implint {
    ($($t:ident)+) => {
        $(
            impl Codec for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn decode(mut reader: impl Read) -> Result<Self> {
                    let mut bytes = Self::default().to_be_bytes();
                    reader.read_exact(bytes.as_mut())?;
                    Ok(Self::from_be_bytes(bytes))
                }

                #[inline]
                fn encode(&self, mut writer: impl Write) -> Result<()> {
                    writer.write_all(&self.to_be_bytes())
                }
            }
        )+
    };
}

implint! {
    u8 u16 u32 u64
    i8 i16 i32 i64
}

/// Declares a packed record and derives its `Codec` impl.
///
/// Fields are encoded in declaration order with no padding, so the record's
/// `SIZE` is the sum of its field sizes.
#[macro_export]
macro_rules! codec {
    () => {};

    (
        $(#[$($sattr:meta)+])*
        $vis:vis struct $name:ident {
            $(
                $(#[$($fattr:meta)+])*
                $v:vis $field:ident: $kind:ty
            ),* $(,)?
        }
        $($next:tt)*
    ) => {
        $(#[$($sattr)+])*
        $vis struct $name {
            $(
                $(#[$($fattr)+])*
                $v $field: $kind
            ),*
        }

        impl $crate::Codec for $name {
            const SIZE: usize = 0 $(+ <$kind as $crate::Codec>::SIZE)*;

            fn decode(mut reader: impl std::io::Read) -> std::io::Result<Self> {
                Ok(Self {
                    $($field: <$kind as $crate::Codec>::decode(&mut reader)?),*
                })
            }

            fn encode(&self, mut writer: impl std::io::Write) -> std::io::Result<()> {
                $($crate::Codec::encode(&self.$field, &mut writer)?;)*
                Ok(())
            }
        }

        codec! { $($next)* }
    };
}
