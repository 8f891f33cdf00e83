//! Multicall calldata layout
//!
//! `[call_count, (to, selector, data_offset, data_len) * call_count,
//! total_len, data...]`, followed by the nonce for v0 accounts. Offsets and
//! lengths index into the aggregated `data` segment.

use stark_primitives::Felt;

use crate::types::FunctionCall;
use crate::SdkError;

/// Felts per call in the call array
const CALL_ARRAY_ENTRY_LEN: usize = 4;

/// Format calldata for a v1 account `__execute__`
pub fn format_calldata(calls: &[FunctionCall]) -> Result<Vec<Felt>, SdkError> {
    let data_len: usize = calls.iter().map(|call| call.calldata.len()).sum();
    let mut call_array = Vec::with_capacity(1 + calls.len() * CALL_ARRAY_ENTRY_LEN);
    let mut data = Vec::with_capacity(data_len);

    call_array.push(Felt::from(calls.len()));
    for call in calls {
        call_array.push(call.contract_address);
        call_array.push(call.selector()?);
        if call.calldata.is_empty() {
            call_array.push(Felt::ZERO);
            call_array.push(Felt::ZERO);
        } else {
            call_array.push(Felt::from(data.len()));
            call_array.push(Felt::from(call.calldata.len()));
            data.extend_from_slice(&call.calldata);
        }
    }

    call_array.push(Felt::from(data.len()));
    call_array.extend(data);
    Ok(call_array)
}

/// Format calldata for a v0 account `__execute__` (nonce appended)
pub fn format_v0_calldata(nonce: Felt, calls: &[FunctionCall]) -> Result<Vec<Felt>, SdkError> {
    let mut calldata = format_calldata(calls)?;
    calldata.push(nonce);
    Ok(calldata)
}

/// [`format_calldata`] as wire hex strings
pub fn format_calldata_strings(calls: &[FunctionCall]) -> Result<Vec<String>, SdkError> {
    Ok(to_hex_strings(&format_calldata(calls)?))
}

/// [`format_v0_calldata`] as wire hex strings
pub fn format_v0_calldata_strings(nonce: Felt, calls: &[FunctionCall]) -> Result<Vec<String>, SdkError> {
    Ok(to_hex_strings(&format_v0_calldata(nonce, calls)?))
}

pub(crate) fn to_hex_strings(felts: &[Felt]) -> Vec<String> {
    felts.iter().map(Felt::to_hex).collect()
}
