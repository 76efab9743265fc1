// src/whatsapp/phone.rs
//
// Normalização de telefones dos responsáveis para o identificador da
// plataforma. O algoritmo precisa ser reproduzido exatamente: os números já
// gravados no banco dependem dele para continuar batendo com os envios.

use thiserror::Error;

// Sufixo de endereço da plataforma (contato individual)
pub const PLATFORM_SUFFIX: &str = "@c.us";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("número muito curto após limpeza: '{0}'")]
    TooShort(String),

    #[error("número com prefixo de país '{prefix}' não bate com o formato esperado: '{digits}'")]
    CountryMismatch { prefix: &'static str, digits: String },
}

// Valida um número egípcio completo: 20 + 1[0125] + 8 dígitos (12 no total)
fn is_valid_egypt(digits: &str) -> bool {
    digits.len() == 12
        && digits.starts_with("201")
        && matches!(digits.as_bytes()[3], b'0' | b'1' | b'2' | b'5')
        && digits.bytes().all(|b| b.is_ascii_digit())
}

// Valida um número saudita completo: 966 + 5 + 8 dígitos (12 no total)
fn is_valid_saudi(digits: &str) -> bool {
    digits.len() == 12
        && digits.starts_with("9665")
        && digits.bytes().all(|b| b.is_ascii_digit())
}

// Normaliza o telefone e devolve o identificador final com sufixo.
//
// Passos, nesta ordem:
//   1. remove tudo que não é dígito;
//   2. prefixo de país reconhecido (20 / 966) -> valida o formato fixo do
//      país e rejeita se não bater;
//   3. remove o zero de tronco local;
//   4. heurísticas por tamanho/dígito inicial: 9 dígitos começando em 5 vira
//      saudita, 11 dígitos começando em 1 vira egípcio;
//   5. sem heurística: menos de 10 dígitos é erro, senão passa como veio
//      (com warning no log).
pub fn format_phone_number(raw: &str) -> Result<String, PhoneError> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    // Prefixos de país reconhecidos validam contra o formato fixo, em
    // qualquer tamanho: um "20..." curto é rejeitado, não deixado passar.
    if digits.starts_with("20") {
        if !is_valid_egypt(&digits) {
            return Err(PhoneError::CountryMismatch { prefix: "20", digits });
        }
        return Ok(format!("{digits}{PLATFORM_SUFFIX}"));
    }
    if digits.starts_with("966") {
        if !is_valid_saudi(&digits) {
            return Err(PhoneError::CountryMismatch { prefix: "966", digits });
        }
        return Ok(format!("{digits}{PLATFORM_SUFFIX}"));
    }

    // Zero de tronco local
    if digits.starts_with('0') {
        digits.remove(0);
    }

    // Heurísticas de país por tamanho e dígito inicial. O celular egípcio
    // local tem 11 dígitos com o zero de tronco (01X + 8), então depois da
    // limpeza ele chega aqui com 10 ou 11 dígitos começando em 1.
    if digits.len() == 9 && digits.starts_with('5') {
        return Ok(format!("966{digits}{PLATFORM_SUFFIX}"));
    }
    if (digits.len() == 10 || digits.len() == 11) && digits.starts_with('1') {
        return Ok(format!("20{digits}{PLATFORM_SUFFIX}"));
    }

    if digits.len() < 10 {
        return Err(PhoneError::TooShort(digits));
    }

    tracing::warn!("📞 Número '{}' não bateu com nenhuma heurística de país, enviando como está", digits);
    Ok(format!("{digits}{PLATFORM_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celular_egipcio_local_ganha_prefixo_20() {
        // Forma local completa (zero de tronco) e forma sem o zero
        assert_eq!(format_phone_number("01012345678").unwrap(), "201012345678@c.us");
        assert_eq!(format_phone_number("1012345678").unwrap(), "201012345678@c.us");
    }

    #[test]
    fn celular_saudita_local_ganha_prefixo_966() {
        assert_eq!(format_phone_number("0512345678").unwrap(), "966512345678@c.us");
        assert_eq!(format_phone_number("512345678").unwrap(), "966512345678@c.us");
    }

    #[test]
    fn numero_ja_com_prefixo_valido_passa_direto() {
        assert_eq!(format_phone_number("+20 101 234 5678").unwrap(), "201012345678@c.us");
        assert_eq!(format_phone_number("966512345678").unwrap(), "966512345678@c.us");
    }

    #[test]
    fn prefixo_reconhecido_com_formato_errado_rejeita() {
        // Começa com 966 mas não segue 9665 + 8 dígitos
        assert!(matches!(
            format_phone_number("96612345"),
            Err(PhoneError::CountryMismatch { prefix: "966", .. })
        ));
        // Começa com 20 mas o quarto dígito não é de celular egípcio
        assert!(matches!(
            format_phone_number("209912345678"),
            Err(PhoneError::CountryMismatch { prefix: "20", .. })
        ));
        // Começa com 20 mas está curto demais para um egípcio completo:
        // rejeita em vez de cair na passagem com warning
        assert!(matches!(
            format_phone_number("2012345678"),
            Err(PhoneError::CountryMismatch { prefix: "20", .. })
        ));
    }

    #[test]
    fn numero_curto_demais_rejeita() {
        assert!(matches!(format_phone_number("12345"), Err(PhoneError::TooShort(_))));
        assert!(matches!(format_phone_number("(12) 345"), Err(PhoneError::TooShort(_))));
    }

    #[test]
    fn numero_sem_heuristica_passa_como_esta() {
        // 12 dígitos que não são 20/966: passa com warning
        assert_eq!(format_phone_number("551199998888").unwrap(), "551199998888@c.us");
    }
}
