//! Fixed runtime helpers emitted into every program's text section.

/// Prints the signed integer in `rax` as decimal via `write(2)`. The caller
/// zeroes `r11` first; the helper sets it to 1 while printing a negated
/// value. Digits are built right-to-left in `int_buffer`, whose byte 20 holds
/// the terminating 0.
pub const PRINT_INTEGER: &str = "\
_print_integer:
    mov rdi, int_buffer + 20
    mov byte [rdi], 0
    dec rdi
    test rax, rax
    jns .utoa_loop
    neg rax
    mov r11, 1
.utoa_loop:
    mov rdx, 0
    mov rbx, 10
    div rbx
    add dl, '0'
    mov [rdi], dl
    dec rdi
    test rax, rax
    jnz .utoa_loop
    cmp r11, 1
    jne .skip_minus
    mov byte [rdi], '-'
    dec rdi
.skip_minus:
    inc rdi
    mov rsi, rdi
    mov rdx, int_buffer + 21
    sub rdx, rsi
    mov rax, 1
    mov rdi, 1
    syscall
    ret";

/// Counts the bytes of the 0-terminated string pointed to by `rdi`; result in
/// `rax`.
pub const STRLEN: &str = "\
_strlen:
    xor rcx, rcx
.strlen_loop:
    cmp byte [rdi + rcx], 0
    je .strlen_end
    inc rcx
    jmp .strlen_loop
.strlen_end:
    mov rax, rcx
    ret";
