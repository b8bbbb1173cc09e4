bitflags::bitflags! {
    /// Coarse classification of a type, computed once when the node is added.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const NONE              = 0;
        const ANY               = 1 << 0;
        const STRING            = 1 << 1;
        const NUMBER            = 1 << 2;
        const BOOLEAN           = 1 << 3;
        const VOID              = 1 << 4;
        const UNDEFINED         = 1 << 5;
        const NULL              = 1 << 6;
        const NEVER             = 1 << 7;
        const STRING_LITERAL    = 1 << 8;
        const NUMBER_LITERAL    = 1 << 9;
        const BOOLEAN_LITERAL   = 1 << 10;
        const OBJECT            = 1 << 11;
        const ARRAY             = 1 << 12;
        const TUPLE             = 1 << 13;
        const UNION             = 1 << 14;
        const INTERSECTION      = 1 << 15;
        const FUNCTION          = 1 << 16;
        const CONSTRUCTOR       = 1 << 17;
        const ALIAS             = 1 << 18;

        const LITERAL = Self::STRING_LITERAL.bits()
            | Self::NUMBER_LITERAL.bits()
            | Self::BOOLEAN_LITERAL.bits();

        const STRING_LIKE = Self::STRING.bits() | Self::STRING_LITERAL.bits();
        const NUMBER_LIKE = Self::NUMBER.bits() | Self::NUMBER_LITERAL.bits();
        const BOOLEAN_LIKE = Self::BOOLEAN.bits() | Self::BOOLEAN_LITERAL.bits();
        const NULLISH = Self::UNDEFINED.bits() | Self::NULL.bits() | Self::VOID.bits();

        const PRIMITIVE = Self::STRING.bits()
            | Self::NUMBER.bits()
            | Self::BOOLEAN.bits()
            | Self::VOID.bits()
            | Self::UNDEFINED.bits()
            | Self::NULL.bits()
            | Self::LITERAL.bits();

        const OBJECT_LIKE = Self::OBJECT.bits()
            | Self::ARRAY.bits()
            | Self::TUPLE.bits()
            | Self::FUNCTION.bits()
            | Self::CONSTRUCTOR.bits();

        const UNION_OR_INTERSECTION = Self::UNION.bits() | Self::INTERSECTION.bits();
    }
}
