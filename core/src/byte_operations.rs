// Bounds-checked little-endian readers. Every macro evaluates to
// `Result<T, TileStreamError>` and only advances the offset on success.

macro_rules! read_u8 {
    ($bytes:expr, $offset:expr) => {{
        match $bytes.get($offset) {
            Some(&val) => {
                $offset += 1;
                Ok::<u8, $crate::error::TileStreamError>(val)
            }
            None => Err($crate::error::TileStreamError::UnexpectedEof {
                offset: $offset,
                needed: 1,
            }),
        }
    }};
}

macro_rules! read_bool {
    ($bytes:expr, $offset:expr) => {{ read_u8!($bytes, $offset).map(|val| val != 0) }};
}

macro_rules! read_u16 {
    ($bytes:expr, $offset:expr) => {{
        match $bytes.get($offset..$offset + 2) {
            Some(chunk) => {
                let val = u16::from_le_bytes([chunk[0], chunk[1]]);
                $offset += 2;
                Ok::<u16, $crate::error::TileStreamError>(val)
            }
            None => Err($crate::error::TileStreamError::UnexpectedEof {
                offset: $offset,
                needed: 2,
            }),
        }
    }};
}

macro_rules! read_u32 {
    ($bytes:expr, $offset:expr) => {{
        match $bytes.get($offset..$offset + 4) {
            Some(chunk) => {
                let val = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                $offset += 4;
                Ok::<u32, $crate::error::TileStreamError>(val)
            }
            None => Err($crate::error::TileStreamError::UnexpectedEof {
                offset: $offset,
                needed: 4,
            }),
        }
    }};
}

macro_rules! read_i32 {
    ($bytes:expr, $offset:expr) => {{ read_u32!($bytes, $offset).map(|val| val as i32) }};
}

#[cfg(test)]
mod tests {
    use crate::error::TileStreamError;

    #[test]
    fn test_read_u8() {
        let bytes = [42u8, 100, 200];
        let mut offset = 0;

        assert_eq!(read_u8!(bytes, offset).unwrap(), 42);
        assert_eq!(offset, 1);
        assert_eq!(read_u8!(bytes, offset).unwrap(), 100);
        assert_eq!(read_u8!(bytes, offset).unwrap(), 200);
        assert_eq!(offset, 3);
    }

    #[test]
    fn test_read_u16() {
        // Little endian: 0x0201
        let bytes = [0x01, 0x02, 0xFF, 0xFF];
        let mut offset = 0;

        assert_eq!(read_u16!(bytes, offset).unwrap(), 0x0201);
        assert_eq!(offset, 2);
        assert_eq!(read_u16!(bytes, offset).unwrap(), 0xFFFF);
        assert_eq!(offset, 4);
    }

    #[test]
    fn test_read_u32_and_i32() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut offset = 0;

        assert_eq!(read_u32!(bytes, offset).unwrap(), 0x04030201);
        assert_eq!(read_i32!(bytes, offset).unwrap(), -1);
        assert_eq!(offset, 8);
    }

    #[test]
    fn test_read_bool() {
        let bytes = [0u8, 1, 7];
        let mut offset = 0;

        assert!(!read_bool!(bytes, offset).unwrap());
        assert!(read_bool!(bytes, offset).unwrap());
        assert!(read_bool!(bytes, offset).unwrap());
    }

    #[test]
    fn short_buffer_reports_eof_without_advancing() {
        let bytes = [0x34u8, 0x12, 0x00];
        let mut offset = 1;

        match read_u32!(bytes, offset) {
            Err(TileStreamError::UnexpectedEof { offset: at, needed }) => {
                assert_eq!(at, 1);
                assert_eq!(needed, 4);
            }
            other => panic!("expected eof, got {:?}", other),
        }
        assert_eq!(offset, 1);
    }

    #[test]
    fn test_mixed_reads() {
        let bytes = [
            0x42, // u8: 66
            0x34, 0x12, // u16: 0x1234
            0x78, 0x56, 0x34, 0x12, // u32: 0x12345678
        ];
        let mut offset = 0;

        assert_eq!(read_u8!(bytes, offset).unwrap(), 66);
        assert_eq!(read_u16!(bytes, offset).unwrap(), 0x1234);
        assert_eq!(read_u32!(bytes, offset).unwrap(), 0x12345678);
        assert_eq!(offset, 7);
    }
}
