//! Arithmetic over GF(2^8) with the primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D), using
//! the generator 0x02. Addition is XOR; multiplication goes through log/exp tables.

const POLYNOMIAL: u16 = 0x11D;

struct Tables {
    // Doubled so that log(a) + log(b) never needs a modulo
    exp: [u8; 510],
    log: [u8; 256],
}

const fn build_tables() -> Tables {
    let mut exp = [0u8; 510];
    let mut log = [0u8; 256];

    let mut x: u16 = 1;
    let mut i = 0;

    while i < 255 {
        exp[i] = x as u8;
        exp[i + 255] = x as u8;
        log[x as usize] = i as u8;

        x <<= 1;
        if x & 0x100 != 0 {
            x ^= POLYNOMIAL;
        }

        i += 1;
    }

    Tables { exp, log }
}

static TABLES: Tables = build_tables();

/// Returns the product of `a` and `b`.
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }

    TABLES.exp[TABLES.log[a as usize] as usize + TABLES.log[b as usize] as usize]
}

/// Returns the multiplicative inverse of `a`.
///
/// # Panics
///
/// Panics if `a` is zero.
pub fn inv(a: u8) -> u8 {
    assert!(a != 0, "zero has no inverse");

    TABLES.exp[255 - TABLES.log[a as usize] as usize]
}

/// Computes `dst += c * src`, element-wise.
pub fn mul_add(dst: &mut [u8], src: &[u8], c: u8) {
    debug_assert!(dst.len() == src.len());

    match c {
        0 => (),
        1 => {
            for (d, &s) in dst.iter_mut().zip(src.iter()) {
                *d ^= s;
            }
        }
        _ => {
            let log_c = TABLES.log[c as usize] as usize;

            for (d, &s) in dst.iter_mut().zip(src.iter()) {
                if s != 0 {
                    *d ^= TABLES.exp[TABLES.log[s as usize] as usize + log_c];
                }
            }
        }
    }
}
