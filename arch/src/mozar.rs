//! Base-4 "Mozar" numerals: digits 0..=3 are written `a`..=`d`.

use crate::word::Word;

const DIGITS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Most significant digit first, no padding. Zero is `"a"`.
pub fn encode_int(mut n: u32) -> String {
    let mut digits = vec![];
    loop {
        digits.push(DIGITS[(n % 4) as usize]);
        n /= 4;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

pub fn decode_int(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    s.chars().try_fold(0u32, |acc, ch| {
        let digit = DIGITS.iter().position(|&d| d == ch)? as u32;
        acc.checked_mul(4)?.checked_add(digit)
    })
}

/// Five letters: the two halves of the opcode field, then source mode,
/// destination mode and memory type. Each field is converted on its own.
pub fn encode_word(word: Word) -> String {
    [
        word.opcode() >> 2,
        word.opcode() & 0x3,
        word.src(),
        word.dst(),
        word.mem_bits(),
    ]
    .iter()
    .map(|&field| encode_int(field as u32))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mode::MemType, op::Opcode, reg::Reg};

    #[test]
    fn int() {
        assert_eq!(encode_int(0), "a");
        assert_eq!(encode_int(3), "d");
        assert_eq!(encode_int(4), "ba");
        assert_eq!(encode_int(100), "bcba");
        assert_eq!(encode_int(1023), "ddddd");
    }

    #[test]
    fn int_round_trip() {
        for n in 0..1024 {
            assert_eq!(decode_int(&encode_int(n)), Some(n));
        }
        assert_eq!(decode_int(""), None);
        assert_eq!(decode_int("abx"), None);
    }

    #[test]
    fn word() {
        assert_eq!(encode_word(Word::inst(Opcode::MOV, None, None)), "aaaaa");
        assert_eq!(encode_word(Word::inst(Opcode::STOP, None, None)), "ddaaa");
        assert_eq!(encode_word(Word::payload(100, MemType::Relocatable).unwrap()), "bcbac");
        assert_eq!(encode_word(Word::regs(Some(Reg::R1), Some(Reg::R2))), "abaca");
        assert_eq!(encode_word(Word::data(-1).unwrap()), "ddddd");
    }
}
