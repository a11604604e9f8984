use crate::{
    file::parser::Parser,
    metadata::{
        signatures::{
            SignatureArray, SignatureMethod, SignatureParameter, SignatureTypeSpec,
            TypeSignature, ELEMENT_TYPE,
        },
        token::Token,
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth of a single type in a signature
const MAX_RECURSION_DEPTH: usize = 50;

/// Parser for method and type specification signatures.
///
/// # Example
///
/// ```rust
/// use cake_intellisense::metadata::signatures::SignatureParser;
///
/// // static string Name(int32)
/// let data = &[0x00, 0x01, 0x0E, 0x08];
/// let mut parser = SignatureParser::new(data);
/// let sig = parser.parse_method_signature()?;
/// assert_eq!(sig.params.len(), 1);
/// # Ok::<(), cake_intellisense::Error>(())
/// ```
///
/// A parser instance consumes its data; use a new one per signature.
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` from a byte slice
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
        }
    }

    fn parse_type(&mut self) -> Result<TypeSignature> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeSignature> {
        let current_byte = self.parser.read_le::<u8>()?;
        match current_byte {
            ELEMENT_TYPE::VOID => Ok(TypeSignature::Void),
            ELEMENT_TYPE::BOOLEAN => Ok(TypeSignature::Boolean),
            ELEMENT_TYPE::CHAR => Ok(TypeSignature::Char),
            ELEMENT_TYPE::I1 => Ok(TypeSignature::I1),
            ELEMENT_TYPE::U1 => Ok(TypeSignature::U1),
            ELEMENT_TYPE::I2 => Ok(TypeSignature::I2),
            ELEMENT_TYPE::U2 => Ok(TypeSignature::U2),
            ELEMENT_TYPE::I4 => Ok(TypeSignature::I4),
            ELEMENT_TYPE::U4 => Ok(TypeSignature::U4),
            ELEMENT_TYPE::I8 => Ok(TypeSignature::I8),
            ELEMENT_TYPE::U8 => Ok(TypeSignature::U8),
            ELEMENT_TYPE::R4 => Ok(TypeSignature::R4),
            ELEMENT_TYPE::R8 => Ok(TypeSignature::R8),
            ELEMENT_TYPE::STRING => Ok(TypeSignature::String),
            ELEMENT_TYPE::OBJECT => Ok(TypeSignature::Object),
            ELEMENT_TYPE::I => Ok(TypeSignature::I),
            ELEMENT_TYPE::U => Ok(TypeSignature::U),
            ELEMENT_TYPE::TYPEDBYREF => Ok(TypeSignature::TypedByRef),
            ELEMENT_TYPE::PTR => {
                self.parse_custom_mods()?;
                Ok(TypeSignature::Ptr(Box::new(self.parse_type()?)))
            }
            ELEMENT_TYPE::BYREF => Ok(TypeSignature::ByRef(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::VALUETYPE => Ok(TypeSignature::ValueType(
                self.parser.read_compressed_token()?,
            )),
            ELEMENT_TYPE::CLASS => Ok(TypeSignature::Class(self.parser.read_compressed_token()?)),
            ELEMENT_TYPE::VAR => Ok(TypeSignature::GenericParamType(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::MVAR => Ok(TypeSignature::GenericParamMethod(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::SZARRAY => {
                self.parse_custom_mods()?;
                Ok(TypeSignature::SzArray(Box::new(self.parse_type()?)))
            }
            ELEMENT_TYPE::ARRAY => {
                let elem_type = self.parse_type()?;
                let rank = self.parser.read_compressed_uint()?;

                // Sizes and lower bounds do not change the declared type
                let num_sizes = self.parser.read_compressed_uint()?;
                for _ in 0..num_sizes {
                    self.parser.read_compressed_uint()?;
                }
                let num_lo_bounds = self.parser.read_compressed_uint()?;
                for _ in 0..num_lo_bounds {
                    self.parser.read_compressed_uint()?;
                }

                Ok(TypeSignature::Array(SignatureArray {
                    base: Box::new(elem_type),
                    rank,
                }))
            }
            ELEMENT_TYPE::GENERICINST => {
                let peek_byte = self.parser.peek_byte()?;
                if peek_byte != ELEMENT_TYPE::CLASS && peek_byte != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - Next byte is not TYPE_CLASS or TYPE_VALUE - {}",
                        peek_byte
                    ));
                }

                let base_type = self.parse_type()?;
                let arg_count = self.parser.read_compressed_uint()?;

                let mut type_args = Vec::with_capacity(arg_count.min(64) as usize);
                for _ in 0..arg_count {
                    type_args.push(self.parse_type()?);
                }

                Ok(TypeSignature::GenericInst(Box::new(base_type), type_args))
            }
            ELEMENT_TYPE::FNPTR => Ok(TypeSignature::FnPtr(Box::new(
                self.parse_method_signature()?,
            ))),
            // Modifiers are not part of the C# type; skip them and read what they modify
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                self.parser.read_compressed_token()?;
                self.parse_custom_mods()?;
                self.parse_type_inner()
            }
            ELEMENT_TYPE::PINNED => self.parse_type_inner(),
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - {}",
                current_byte
            )),
        }
    }

    /// Parse custom modifiers (`CMOD_OPT` or `CMOD_REQD`)
    fn parse_custom_mods(&mut self) -> Result<Vec<Token>> {
        let mut mods = Vec::new();

        while self.parser.has_more_data() {
            let next_byte = self.parser.peek_byte()?;
            if next_byte != ELEMENT_TYPE::CMOD_OPT && next_byte != ELEMENT_TYPE::CMOD_REQD {
                break;
            }

            self.parser.advance()?;

            mods.push(self.parser.read_compressed_token()?);
        }

        Ok(mods)
    }

    /// Parse a parameter including custom modifiers (`return_type` counts as parameter)
    fn parse_param(&mut self) -> Result<SignatureParameter> {
        let custom_mods = self.parse_custom_mods()?;

        let mut by_ref = false;
        if self.parser.peek_byte()? == ELEMENT_TYPE::BYREF {
            self.parser.advance()?;
            by_ref = true;
        }

        Ok(SignatureParameter {
            modifiers: custom_mods,
            by_ref,
            base: self.parse_type()?,
        })
    }

    /// Parse a method signature from the blob - `MethodDefSig`, `MethodRefSig`, `StandAloneMethodSig`
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or if reading beyond the buffer bounds.
    pub fn parse_method_signature(&mut self) -> Result<SignatureMethod> {
        let convention_byte = self.parser.read_le::<u8>()?;

        let param_count_generic = if convention_byte & 0x10 != 0 {
            self.parser.read_compressed_uint()?
        } else {
            0
        };
        let param_count = self.parser.read_compressed_uint()?;

        let mut method = SignatureMethod {
            has_this: convention_byte & 0x20 != 0,
            explicit_this: convention_byte & 0x40 != 0,
            vararg: convention_byte & 0x0F == 0x05,
            param_count_generic,
            return_type: self.parse_param()?,
            params: Vec::with_capacity(param_count.min(64) as usize),
            varargs: Vec::new(),
        };

        let mut in_varargs = false;
        for _ in 0..param_count {
            if self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                self.parser.advance()?;
                in_varargs = true;
            }

            let param = self.parse_param()?;
            if in_varargs {
                method.varargs.push(param);
            } else {
                method.params.push(param);
            }
        }

        Ok(method)
    }

    /// Parse a type specification signature from the blob (II.23.2.14)
    ///
    /// # Errors
    /// Returns an error if the type cannot be parsed.
    pub fn parse_type_spec_signature(&mut self) -> Result<SignatureTypeSpec> {
        Ok(SignatureTypeSpec {
            base: self.parse_type()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn static_method_with_array() {
        // static bool Foo(class ICakeContext, int32, string[])
        let data = [0x00, 0x03, 0x02, 0x12, 0x05, 0x08, 0x1D, 0x0E];
        let sig = SignatureParser::new(&data).parse_method_signature().unwrap();

        assert!(!sig.has_this);
        assert_eq!(sig.param_count_generic, 0);
        assert_eq!(sig.return_type.base, TypeSignature::Boolean);
        assert_eq!(sig.params.len(), 3);
        assert_eq!(sig.params[0].base, TypeSignature::Class(Token::new(0x0100_0001)));
        assert_eq!(sig.params[1].base, TypeSignature::I4);
        assert_eq!(
            sig.params[2].base,
            TypeSignature::SzArray(Box::new(TypeSignature::String))
        );
    }

    #[test]
    fn generic_method() {
        // static !!0 Bar<1>(class ICakeContext, !!0)
        let data = [0x10, 0x01, 0x02, 0x1E, 0x00, 0x12, 0x05, 0x1E, 0x00];
        let sig = SignatureParser::new(&data).parse_method_signature().unwrap();

        assert_eq!(sig.param_count_generic, 1);
        assert_eq!(sig.return_type.base, TypeSignature::GenericParamMethod(0));
        assert_eq!(sig.params[1].base, TypeSignature::GenericParamMethod(0));
    }

    #[test]
    fn by_ref_and_modifiers() {
        // static void M(ctx, int32&, modreq(TypeRef 2) int32&)
        let data = [
            0x00, 0x03, 0x01, 0x12, 0x05, 0x10, 0x08, 0x1F, 0x09, 0x10, 0x08,
        ];
        let sig = SignatureParser::new(&data).parse_method_signature().unwrap();

        assert_eq!(sig.return_type.base, TypeSignature::Void);
        assert!(sig.params[1].by_ref);
        assert_eq!(sig.params[1].base, TypeSignature::I4);
        assert!(sig.params[2].by_ref);
        assert_eq!(sig.params[2].modifiers, vec![Token::new(0x0100_0002)]);
    }

    #[test]
    fn generic_instance_and_array() {
        // GENERICINST CLASS TypeRef 3 <string, VALUETYPE TypeDef 1>
        let data = [0x15, 0x12, 0x0D, 0x02, 0x0E, 0x11, 0x04];
        let spec = SignatureParser::new(&data)
            .parse_type_spec_signature()
            .unwrap();

        assert_eq!(
            spec.base,
            TypeSignature::GenericInst(
                Box::new(TypeSignature::Class(Token::new(0x0100_0003))),
                vec![
                    TypeSignature::String,
                    TypeSignature::ValueType(Token::new(0x0200_0001))
                ]
            )
        );

        // int32[,] with one size and no lower bounds
        let data = [0x14, 0x08, 0x02, 0x01, 0x04, 0x00];
        let spec = SignatureParser::new(&data)
            .parse_type_spec_signature()
            .unwrap();
        assert_eq!(
            spec.base,
            TypeSignature::Array(SignatureArray {
                base: Box::new(TypeSignature::I4),
                rank: 2
            })
        );
    }

    #[test]
    fn generic_inst_requires_class_or_valuetype() {
        let data = [0x15, 0x08, 0x01, 0x08];
        assert!(SignatureParser::new(&data)
            .parse_type_spec_signature()
            .is_err());
    }

    #[test]
    fn recursion_limit() {
        let mut data = vec![0x0F; 100];
        data.push(0x08);
        assert!(matches!(
            SignatureParser::new(&data).parse_type_spec_signature(),
            Err(Error::RecursionLimit(_))
        ));

        // Wide but shallow signatures stay within the limit
        let mut data = vec![0x00, 60, 0x01];
        data.extend(std::iter::repeat(0x08).take(60));
        let sig = SignatureParser::new(&data).parse_method_signature().unwrap();
        assert_eq!(sig.params.len(), 60);
    }

    #[test]
    fn truncated() {
        assert!(SignatureParser::new(&[0x00, 0x02, 0x01, 0x08])
            .parse_method_signature()
            .is_err());
        assert!(SignatureParser::new(&[]).parse_method_signature().is_err());
    }
}
