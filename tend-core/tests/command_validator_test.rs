use tend_core::CommandValidator;

#[test]
fn test_command_validator_allows_valid_commands() {
    let validator = CommandValidator::new();
    assert!(validator.validate("tasks.build.pre_run", "npm run lint").is_ok());
    assert!(validator
        .validate("toolchain.fixer", "eslint --fix . && prettier --write .")
        .is_ok());
}

#[test]
fn test_command_validator_rejects_empty() {
    let validator = CommandValidator::new();
    assert!(validator.validate("toolchain.test", "").is_err());
    assert!(validator.validate("toolchain.test", "   ").is_err());
}

#[test]
fn test_command_validator_allows_shell_operators() {
    let validator = CommandValidator::new();
    assert!(validator.validate("hook", "npm test | tee test.log").is_ok());
    assert!(validator.validate("hook", "echo $HOME; ls").is_ok());
}

#[test]
fn test_command_validator_rejects_control_characters() {
    let validator = CommandValidator::new();
    assert!(validator.validate("hook", "npm\0test").is_err());
    assert!(validator.validate("hook", "npm test\r\nmalicious").is_err());
}

#[test]
fn test_command_validator_rejects_excessive_length() {
    let validator = CommandValidator::new();
    let long_command = "a".repeat(10_001);
    assert!(validator.validate("hook", &long_command).is_err());
}

#[test]
fn test_error_names_the_field() {
    let err = CommandValidator::new()
        .validate("tasks.fix.post_run", "")
        .unwrap_err();
    assert!(err.to_string().contains("tasks.fix.post_run"));
}
