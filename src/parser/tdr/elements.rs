use crate::error::ParseError;
use crate::structs_and_impls::*;

/// Decoder for the flat `elements_0` arrays of TDR regions.
///
/// A block is a repetition of `[tag, n0, .., nd]` where the tag names the
/// simplex (0 point, 1 edge, 2 triangle, 5 tetrahedron) and fixes the stride
/// to `dimension + 2`. Mixed blocks are rejected.
pub struct ElementBlockDecoder;

impl ElementBlockDecoder {
    pub fn decode(data: &[i64]) -> Result<ElementTable, ParseError> {
        let tag = *data.first().ok_or_else(|| malformed("empty element block".to_string()))?;
        let shape = ElementShape::from_tdr_tag(tag)
            .ok_or_else(|| malformed(format!("unknown element tag {}", tag)))?;

        let stride = shape.nodes_per_element() + 1;            // Tag position plus the nodes
        if data.len() % stride != 0 {
            return Err(malformed(format!(
                "{} values cannot hold {} records of stride {}",
                data.len(),
                shape.name(),
                stride
            )));
        }

        let mut elements = Vec::with_capacity(data.len() / stride);
        for (position, record) in data.chunks_exact(stride).enumerate() {
            if record[0] != tag {
                return Err(malformed(format!(
                    "element {} has tag {}, block started with {}",
                    position, record[0], tag
                )));
            }

            let nodes = record[1..]
                .iter()
                .map(|&n| {
                    usize::try_from(n)
                        .map_err(|_| malformed(format!("element {} has node index {}", position, n)))
                })
                .collect::<Result<Vec<usize>, ParseError>>()?;
            elements.push(nodes);
        }

        Ok(ElementTable::new(shape, elements))
    }

    /// Interleave the tags back in, the inverse of `decode`
    pub fn encode(table: &ElementTable) -> Vec<i64> {
        let tag = table.shape.tdr_tag();
        let mut data = Vec::with_capacity(table.len() * (table.shape.nodes_per_element() + 1));
        for element in &table.elements {
            data.push(tag);
            data.extend(element.iter().map(|&n| n as i64));
        }
        data
    }
}

fn malformed(reason: String) -> ParseError {
    ParseError::MalformedElementBlock { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_triangles() {
        let table = ElementBlockDecoder::decode(&[2, 0, 1, 2, 2, 2, 1, 3]).unwrap();
        assert_eq!(table.shape, ElementShape::Triangle);
        assert_eq!(table.elements, vec![vec![0, 1, 2], vec![2, 1, 3]]);
        assert_eq!(table.coordinates, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_decode_tetrahedra_and_points() {
        let tets = ElementBlockDecoder::decode(&[5, 3, 2, 1, 0, 5, 1, 2, 3, 4]).unwrap();
        assert_eq!(tets.dimension(), 3);
        assert_eq!(tets.len(), 2);

        let points = ElementBlockDecoder::decode(&[0, 7, 0, 3]).unwrap();
        assert_eq!(points.shape, ElementShape::Point);
        assert_eq!(points.elements, vec![vec![7], vec![3]]);
    }

    #[test]
    fn test_round_trip_recovers_block() {
        let block = vec![1, 4, 2, 1, 2, 9, 1, 9, 4];
        let table = ElementBlockDecoder::decode(&block).unwrap();
        assert_eq!(ElementBlockDecoder::encode(&table), block);
    }

    #[test]
    fn test_mixed_tags_are_rejected() {
        let err = ElementBlockDecoder::decode(&[2, 0, 1, 2, 1, 2, 1, 3]).unwrap_err();
        assert!(matches!(err, ParseError::MalformedElementBlock { .. }));
    }

    #[test]
    fn test_truncated_and_unknown_blocks_are_rejected() {
        assert!(ElementBlockDecoder::decode(&[2, 0, 1]).is_err());
        assert!(ElementBlockDecoder::decode(&[]).is_err());
        assert!(ElementBlockDecoder::decode(&[3, 0, 1, 2, 3]).is_err());
        assert!(ElementBlockDecoder::decode(&[1, 0, -1]).is_err());
    }
}
