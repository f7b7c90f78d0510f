use crate::unit::{Assembly, Segment};
use arch::mozar::{encode_int, encode_word};
use color_print::cformat;

pub fn print_dump(path: &str, source: &str, asm: &Assembly) {
    println!(
        "{}+------[{}]{}",
        "-".repeat(31),
        path,
        "-".repeat(45usize.saturating_sub(path.len()))
    );
    let mut rows = asm.rows.iter().peekable();
    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let mut words = vec![];
        while let Some(row) = rows.next_if(|row| row.line == line_no) {
            let image = match row.segment {
                Segment::Code => &asm.code,
                Segment::Data => &asm.data,
            };
            for k in row.offset..row.offset + row.len {
                words.push((asm.address(row.segment, k), image.words()[k]));
            }
        }

        match words.split_first() {
            None => println!("{:30} | {:>4}: {}", "", line_no, raw),
            Some((&(addr, word), rest)) => {
                println!(
                    "{} {} | {:>4}: {}",
                    cformat!("<c>{:>4}</> {:<5}", addr, encode_int(addr)),
                    cformat!("<g>{}</> {}", encode_word(word), word.cformat()),
                    line_no,
                    raw
                );
                for &(addr, word) in rest {
                    println!(
                        "{} {} |",
                        cformat!("<c>{:>4}</> {:<5}", addr, encode_int(addr)),
                        cformat!("<g>{}</> {}", encode_word(word), word.cformat()),
                    );
                }
            }
        }
    }
    println!("{}+{}", "-".repeat(31), "-".repeat(53));
}
