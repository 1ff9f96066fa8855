//! CPF (Cadastro de Pessoas Físicas) check digit verification.

const CPF_LEN: usize = 11;

/// Punctuation is ignored; anything else that is not a digit makes the value invalid.
pub fn is_valid(input: &str) -> bool {
    let mut digits = Vec::with_capacity(CPF_LEN);
    for ch in input.chars() {
        match ch {
            '0'..='9' => digits.push(ch as u32 - '0' as u32),
            '.' | '-' | ' ' => {}
            _ => return false,
        }
    }

    if digits.len() != CPF_LEN {
        return false;
    }

    // Repeated digits satisfy the checksum but are never issued.
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(idx, digit)| digit * (weight_start - idx as u32))
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 { 0 } else { rest }
}

#[cfg(test)]
mod tests {
    use super::is_valid;

    #[test]
    fn accepts_known_valid_numbers() {
        assert!(is_valid("52998224725"));
        assert!(is_valid("529.982.247-25"));
        assert!(is_valid("11144477735"));
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert!(!is_valid("52998224724"));
        assert!(!is_valid("111.444.777-36"));
    }

    #[test]
    fn rejects_repeated_digits_and_bad_lengths() {
        assert!(!is_valid("00000000000"));
        assert!(!is_valid("99999999999"));
        assert!(!is_valid("5299822472"));
        assert!(!is_valid("529982247250"));
        assert!(!is_valid("5299822472a"));
    }
}
