//! Small bitset value types for spring characteristics and destroy options.

use core::ops::{BitAnd, BitOr, BitOrAssign};
use serde::{Deserialize, Serialize};

macro_rules! bit_flags {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $flag:ident = $value:expr;)* }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u8);

        impl $name {
            $($(#[$fmeta])* pub const $flag: $name = $name($value);)*

            pub const fn empty() -> Self { $name(0) }
            pub const fn bits(self) -> u8 { self.0 }
            pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
            pub const fn is_empty(self) -> bool { self.0 == 0 }
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self { $name(self.0 | rhs.0) }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) { self.0 |= rhs.0; }
        }

        impl BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self { $name(self.0 & rhs.0) }
        }
    };
}

bit_flags! {
    /// Structural properties of a spring.
    Characteristics {
        /// Blocks water propagation.
        HULL = 1;
        /// Drawn as a rope.
        ROPE = 2;
    }
}

bit_flags! {
    /// How a spring destruction propagates.
    ///
    /// Without `DESTROY_ALL_TRIANGLES` only the triangles using the spring as
    /// an edge go away; with it, every triangle touching either endpoint does.
    DestroyOptions {
        FIRE_BREAK_EVENT = 1;
        DESTROY_ALL_TRIANGLES = 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_query() {
        let options = DestroyOptions::FIRE_BREAK_EVENT | DestroyOptions::DESTROY_ALL_TRIANGLES;
        assert!(options.contains(DestroyOptions::FIRE_BREAK_EVENT));
        assert!(options.contains(DestroyOptions::DESTROY_ALL_TRIANGLES));
        assert_eq!(options.bits(), 3);

        let rope = Characteristics::ROPE;
        assert!(!rope.contains(Characteristics::HULL));
        assert!(Characteristics::empty().is_empty());
        assert!((rope & Characteristics::HULL).is_empty());
    }
}
